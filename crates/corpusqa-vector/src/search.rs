use anyhow::{anyhow, Result};
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{DistanceType, Table};
use tracing::debug;

use corpusqa_core::config::Metric;
use corpusqa_core::types::{Neighbor, Segment};

use crate::schema::{SEGMENT_COLUMNS, VECTOR_COLUMN};
use crate::{distance, sort_neighbors};

/// Over-fetch factor so ties at the k-th distance resolve by `seq`.
const OVERFETCH: usize = 4;

pub fn distance_type(metric: Metric) -> DistanceType {
    match metric {
        Metric::L2 => DistanceType::L2,
        Metric::Cosine => DistanceType::Cosine,
    }
}

/// Up to `k` rows of `table` nearest to `vector`, ascending distance then `seq`.
///
/// LanceDB picks the candidates; their distances are recomputed from the
/// stored vectors with [`distance`] so ties compare equal exactly as they do
/// in the in-memory index.
pub async fn nearest(
    table: &Table,
    vector: &[f32],
    k: usize,
    metric: Metric,
) -> Result<Vec<Neighbor>> {
    let mut columns = SEGMENT_COLUMNS.to_vec();
    columns.push(VECTOR_COLUMN);
    let mut stream = table
        .vector_search(vector.to_vec())?
        .distance_type(distance_type(metric))
        .select(Select::columns(&columns))
        .limit(k.saturating_mul(OVERFETCH))
        .execute()
        .await?;
    let mut hits = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let rows = column::<FixedSizeListArray>(&batch, VECTOR_COLUMN)?;
        let segments = batch_segments(&batch)?;
        for (i, segment) in segments.into_iter().enumerate() {
            let row = rows.value(i);
            let row = row
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| anyhow!("vector column does not hold f32 values"))?;
            let distance = distance(metric, vector, row.values());
            if !distance.is_finite() {
                debug!(id = %segment.id, "dropping non-finite distance");
                continue;
            }
            hits.push(Neighbor { segment, distance });
        }
    }
    sort_neighbors(&mut hits);
    hits.truncate(k);
    Ok(hits)
}

/// Every segment stored in `table`, in `seq` order.
pub async fn read_segments(table: &Table) -> Result<Vec<Segment>> {
    let count = table.count_rows(None).await?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut stream = table
        .query()
        .select(Select::columns(&SEGMENT_COLUMNS))
        .limit(count)
        .execute()
        .await?;
    let mut segments = Vec::with_capacity(count);
    while let Some(batch) = stream.try_next().await? {
        segments.extend(batch_segments(&batch)?);
    }
    segments.sort_by_key(|s| s.seq);
    Ok(segments)
}

fn batch_segments(batch: &RecordBatch) -> Result<Vec<Segment>> {
    let ids = column::<StringArray>(batch, "id")?;
    let seqs = column::<Int32Array>(batch, "seq")?;
    let texts = column::<StringArray>(batch, "text")?;
    let previews = column::<StringArray>(batch, "preview")?;
    (0..batch.num_rows())
        .map(|i| {
            Ok(Segment {
                id: ids.value(i).to_string(),
                seq: usize::try_from(seqs.value(i))?,
                text: texts.value(i).to_string(),
                preview: previews.value(i).to_string(),
            })
        })
        .collect()
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow!("column '{name}' missing or of unexpected type"))
}
