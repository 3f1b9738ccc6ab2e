//! Arrow schemas for generation slots and the key/value meta table.
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const VECTOR_COLUMN: &str = "vector";
pub const SEGMENT_COLUMNS: [&str; 4] = ["id", "seq", "text", "preview"];

/// Segment rows of one generation; `dim` is the fitted vocabulary size.
pub fn build_segments_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("seq", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("preview", DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}

pub fn build_meta_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
        Field::new("updated_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
    ]))
}

/// Width of the vector column, if the schema has one.
pub fn vector_width(schema: &Schema) -> Option<usize> {
    match schema.field_with_name(VECTOR_COLUMN).ok()?.data_type() {
        DataType::FixedSizeList(_, n) => usize::try_from(*n).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_round_trips_through_schema() {
        assert_eq!(vector_width(&build_segments_schema(37)), Some(37));
        assert_eq!(vector_width(&build_meta_schema()), None);
    }
}
