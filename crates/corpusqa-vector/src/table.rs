//! LanceDB connection and the `meta` key/value table.
//!
//! `meta` holds one row per key. The store writes three kinds of keys:
//! `<collection>.active` names the active slot table, while
//! `<slot>.fingerprint` and `<slot>.built_at` describe what a slot holds.
use anyhow::{anyhow, Result};
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};
use std::sync::Arc;

use crate::schema::build_meta_schema;

pub const META_TABLE: &str = "meta";

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Open `meta`, creating it empty on first use.
async fn meta_table(conn: &Connection) -> Result<Table> {
    if !table_exists(conn, META_TABLE).await? {
        let schema = build_meta_schema();
        let empty = RecordBatchIterator::new(Vec::new().into_iter(), schema);
        conn.create_table(META_TABLE, Box::new(empty)).execute().await?;
    }
    Ok(conn.open_table(META_TABLE).execute().await?)
}

/// Record `key = value`, replacing any earlier value and stamping `updated_at`.
///
/// Writing `<collection>.active` is the commit point of a rebuild.
pub async fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let meta = meta_table(conn).await?;
    let row = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from(vec![key])),
            Arc::new(StringArray::from(vec![value])),
            Arc::new(TimestampMillisecondArray::from(vec![Utc::now().timestamp_millis()])),
        ],
    )?;
    let rows = RecordBatchIterator::new(vec![Ok(row)].into_iter(), build_meta_schema());
    let mut upsert = meta.merge_insert(&["key"]);
    upsert.when_matched_update_all(None).when_not_matched_insert_all();
    upsert.execute(Box::new(rows)).await?;
    Ok(())
}

/// Value of `key`, or `None` when unset or when `meta` was never created.
pub async fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    if !table_exists(conn, META_TABLE).await? {
        return Ok(None);
    }
    let meta = conn.open_table(META_TABLE).execute().await?;
    let filter = format!("key = '{}'", key.replace('\'', "''"));
    let mut stream = meta.query().only_if(filter).limit(1).execute().await?;
    while let Some(batch) = stream.try_next().await? {
        if batch.num_rows() == 0 {
            continue;
        }
        let values = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow!("meta.value column missing"))?;
        return Ok(Some(values.value(0).to_string()));
    }
    Ok(None)
}
