//! Persisted index store on LanceDB.
//!
//! Each collection owns two slot tables, `<collection>__blue` and
//! `<collection>__green`. A rebuild overwrites the inactive slot, records its
//! fingerprint and build time in the `meta` table, then flips the
//! `<collection>.active` pointer. Until that flip succeeds the previous
//! generation stays active, on disk and in memory.
use async_trait::async_trait;
use chrono::Utc;
use lancedb::{Connection, Table};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use corpusqa_core::config::{Config, Metric};
use corpusqa_core::types::{Neighbor, Segment, StoreStats, StoreStatus};
use corpusqa_core::{Error, Result};
use corpusqa_embed::TfIdfVectorizer;
use corpusqa_text::TextSplitter;

use crate::schema::vector_width;
use crate::search::{nearest, read_segments};
use crate::table::{get_meta, open_db, set_meta, table_exists};
use crate::writer::{segments_to_record_batch, write_slot};
use crate::{check_k, fingerprint, Generation, IndexOptions, SegmentIndex};

const SLOTS: [&str; 2] = ["blue", "green"];

/// One loaded generation: a slot table plus the vectorizer fit on its texts.
pub struct IndexGeneration {
    slot: String,
    table: Table,
    vectorizer: TfIdfVectorizer,
    document_count: usize,
    fingerprint: String,
    metric: Metric,
}

impl IndexGeneration {
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

#[async_trait]
impl Generation for IndexGeneration {
    fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    fn document_count(&self) -> usize {
        self.document_count
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        check_k(k)?;
        if self.document_count == 0 {
            return Ok(Vec::new());
        }
        nearest(&self.table, vector, k, self.metric).await.map_err(store_err)
    }
}

pub struct IndexStore {
    conn: Connection,
    options: IndexOptions,
    active: RwLock<Option<Arc<IndexGeneration>>>,
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl IndexStore {
    /// Attach to the database at `db_path`. No generation is active until
    /// [`load`](Self::load) or [`rebuild`](SegmentIndex::rebuild) succeeds.
    pub async fn open(db_path: &Path, options: IndexOptions) -> Result<Self> {
        let conn = open_db(db_path.to_string_lossy().as_ref()).await.map_err(store_err)?;
        Ok(Self {
            conn,
            options,
            active: RwLock::new(None),
            rebuild_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let settings = config.settings()?;
        let db_path = config.lancedb_dir()?;
        std::fs::create_dir_all(&db_path)?;
        Self::open(&db_path, IndexOptions::from_settings(&settings)).await
    }

    pub fn active_generation(&self) -> Option<Arc<IndexGeneration>> {
        self.active.read().clone()
    }

    /// Chunk `text` and rebuild from the resulting segments.
    pub async fn rebuild_from_text(&self, text: &str, splitter: &TextSplitter) -> Result<usize> {
        let segments = splitter.split(text);
        if segments.is_empty() {
            error!(collection = %self.options.collection, "corpus produced no segments");
            return Err(Error::EmptyCorpus);
        }
        self.rebuild(segments).await
    }

    /// Attach to the persisted active generation and refit its vectorizer
    /// from the stored segment texts.
    pub async fn load(&self) -> Result<()> {
        let _guard = self.rebuild_lock.lock().await;
        let generation = self.load_active().await.inspect_err(|e| {
            warn!(collection = %self.options.collection, error = %e, "index load failed");
        })?;
        info!(
            collection = %self.options.collection,
            slot = %generation.slot,
            segments = generation.document_count,
            "index loaded"
        );
        *self.active.write() = Some(Arc::new(generation));
        Ok(())
    }

    async fn load_active(&self) -> Result<IndexGeneration> {
        let slot = get_meta(&self.conn, &self.pointer_key())
            .await
            .map_err(store_err)?
            .ok_or_else(|| {
                Error::StoreUnavailable(format!(
                    "collection '{}' has never been built",
                    self.options.collection
                ))
            })?;
        if !table_exists(&self.conn, &slot).await.map_err(store_err)? {
            return Err(Error::StoreUnavailable(format!("active slot '{slot}' is missing")));
        }
        let table = self.conn.open_table(&slot).execute().await.map_err(|e| store_err(e.into()))?;
        let segments = read_segments(&table).await.map_err(store_err)?;
        let mut vectorizer = TfIdfVectorizer::new(self.options.max_features);
        if segments.is_empty() {
            warn!(slot = %slot, "active slot holds no segments");
            return Ok(self.generation(slot, table, vectorizer, &segments));
        }

        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        vectorizer.fit_transform(&texts)?;
        let schema = table.schema().await.map_err(|e| store_err(e.into()))?;
        let stored = vector_width(&schema);
        if stored != Some(vectorizer.dim()) {
            return Err(Error::Store(format!(
                "refit vocabulary has {} terms but slot '{slot}' stores vectors of width {:?}",
                vectorizer.dim(),
                stored
            )));
        }
        let generation = self.generation(slot, table, vectorizer, &segments);
        match get_meta(&self.conn, &fingerprint_key(&generation.slot)).await {
            Ok(Some(recorded)) if recorded != generation.fingerprint => {
                warn!(slot = %generation.slot, "stored fingerprint differs from slot contents");
            }
            Err(e) => warn!(error = %e, "could not read generation fingerprint"),
            _ => {}
        }
        Ok(generation)
    }

    async fn rebuild_inner(&self, texts: Vec<String>) -> Result<usize> {
        let mut vectorizer = TfIdfVectorizer::new(self.options.max_features);
        let vectors = vectorizer.fit_transform(&texts)?;
        let segments = Segment::from_texts(texts, self.options.preview_chars);
        let slot = self.inactive_slot().await?;
        let batch = segments_to_record_batch(&segments, &vectors, vectorizer.dim())
            .map_err(rebuild_err)?;
        write_slot(&self.conn, &slot, batch).await.map_err(rebuild_err)?;

        let digest = fingerprint(&texts_of(&segments));
        set_meta(&self.conn, &fingerprint_key(&slot), &digest).await.map_err(rebuild_err)?;
        set_meta(&self.conn, &format!("{slot}.built_at"), &Utc::now().to_rfc3339())
            .await
            .map_err(rebuild_err)?;
        let table = self.conn.open_table(&slot).execute().await.map_err(|e| rebuild_err(e.into()))?;
        // Flip: from here on the new slot is the active generation.
        set_meta(&self.conn, &self.pointer_key(), &slot).await.map_err(rebuild_err)?;

        let generation = self.generation(slot, table, vectorizer, &segments);
        let count = generation.document_count;
        info!(
            collection = %self.options.collection,
            slot = %generation.slot,
            segments = count,
            terms = generation.vectorizer.dim(),
            "index rebuilt"
        );
        *self.active.write() = Some(Arc::new(generation));
        Ok(count)
    }

    async fn inactive_slot(&self) -> Result<String> {
        let active = get_meta(&self.conn, &self.pointer_key()).await.map_err(rebuild_err)?;
        let [blue, green] = SLOTS.map(|s| self.slot_name(s));
        Ok(if active.as_deref() == Some(blue.as_str()) { green } else { blue })
    }

    fn generation(
        &self,
        slot: String,
        table: Table,
        vectorizer: TfIdfVectorizer,
        segments: &[Segment],
    ) -> IndexGeneration {
        IndexGeneration {
            slot,
            table,
            vectorizer,
            document_count: segments.len(),
            fingerprint: fingerprint(&texts_of(segments)),
            metric: self.options.metric,
        }
    }

    fn slot_name(&self, color: &str) -> String {
        format!("{}__{color}", self.options.collection)
    }

    fn pointer_key(&self) -> String {
        format!("{}.active", self.options.collection)
    }
}

#[async_trait]
impl SegmentIndex for IndexStore {
    fn current(&self) -> Option<Arc<dyn Generation>> {
        self.active_generation().map(|g| g as Arc<dyn Generation>)
    }

    async fn rebuild(&self, segments: Vec<String>) -> Result<usize> {
        let _guard = self.rebuild_lock.lock().await;
        self.rebuild_inner(segments).await.inspect_err(|e| {
            error!(collection = %self.options.collection, error = %e, "index rebuild failed");
        })
    }

    async fn stats(&self) -> StoreStats {
        let Some(generation) = self.active_generation() else {
            return StoreStats::not_initialized(&self.options.collection);
        };
        let mut stats = StoreStats {
            status: StoreStatus::Initialized,
            document_count: generation.document_count,
            collection: self.options.collection.clone(),
            fingerprint: Some(generation.fingerprint.clone()),
            error: None,
        };
        match generation.table.count_rows(None).await {
            Ok(rows) => stats.document_count = rows,
            Err(e) => {
                stats.status = StoreStatus::Error;
                stats.error = Some(e.to_string());
            }
        }
        stats
    }
}

fn fingerprint_key(slot: &str) -> String {
    format!("{slot}.fingerprint")
}

fn texts_of(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(|s| s.text.as_str()).collect()
}

fn store_err(e: anyhow::Error) -> Error {
    Error::Store(format!("{e:#}"))
}

fn rebuild_err(e: anyhow::Error) -> Error {
    Error::RebuildFailure(format!("{e:#}"))
}
