use anyhow::{anyhow, Result};
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::table::AddDataMode;
use lancedb::Connection;
use std::sync::Arc;

use corpusqa_core::types::Segment;

use crate::schema::build_segments_schema;
use crate::table::table_exists;

/// Build the record batch of one generation. Rows keep segment order.
pub fn segments_to_record_batch(
    segments: &[Segment],
    vectors: &[Vec<f32>],
    dim: usize,
) -> Result<RecordBatch> {
    if segments.len() != vectors.len() {
        return Err(anyhow!("{} segments but {} vectors", segments.len(), vectors.len()));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(anyhow!("vector width {} does not match vocabulary size {dim}", bad.len()));
    }
    let width = i32::try_from(dim)?;
    let mut ids = Vec::with_capacity(segments.len());
    let mut seqs = Vec::with_capacity(segments.len());
    let mut texts = Vec::with_capacity(segments.len());
    let mut previews = Vec::with_capacity(segments.len());
    for seg in segments {
        ids.push(seg.id.as_str());
        seqs.push(i32::try_from(seg.seq)?);
        texts.push(seg.text.as_str());
        previews.push(seg.preview.as_str());
    }
    let vectors = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
    let record_batch = RecordBatch::try_new(
        build_segments_schema(width),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(Int32Array::from(seqs)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(previews)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, width)),
        ],
    )?;
    Ok(record_batch)
}

/// Replace the whole content of slot table `name` with `batch`.
pub async fn write_slot(conn: &Connection, name: &str, batch: RecordBatch) -> Result<()> {
    let schema = batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    if table_exists(conn, name).await? {
        conn.open_table(name)
            .execute()
            .await?
            .add(reader)
            .mode(AddDataMode::Overwrite)
            .execute()
            .await?;
    } else {
        conn.create_table(name, reader).execute().await?;
    }
    Ok(())
}
