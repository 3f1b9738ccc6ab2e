use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use corpusqa_core::config::Metric;
use corpusqa_core::types::{Neighbor, Segment, StoreStats, StoreStatus};
use corpusqa_core::Result;
use corpusqa_embed::TfIdfVectorizer;

use crate::{check_k, distance, fingerprint, sort_neighbors, Generation, IndexOptions, SegmentIndex};

/// Brute-force index over segments held in memory. Nothing is persisted.
pub struct MemoryIndex {
    options: IndexOptions,
    active: RwLock<Option<Arc<MemoryGeneration>>>,
}

pub struct MemoryGeneration {
    vectorizer: TfIdfVectorizer,
    segments: Vec<Segment>,
    vectors: Vec<Vec<f32>>,
    fingerprint: String,
    metric: Metric,
}

impl MemoryIndex {
    pub fn new(options: IndexOptions) -> Self {
        Self { options, active: RwLock::new(None) }
    }
}

#[async_trait]
impl Generation for MemoryGeneration {
    fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    fn document_count(&self) -> usize {
        self.segments.len()
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        check_k(k)?;
        let mut hits: Vec<Neighbor> = self
            .segments
            .iter()
            .zip(&self.vectors)
            .map(|(segment, v)| Neighbor {
                segment: segment.clone(),
                distance: distance(self.metric, vector, v),
            })
            .filter(|n| n.distance.is_finite())
            .collect();
        sort_neighbors(&mut hits);
        hits.truncate(k);
        Ok(hits)
    }
}

#[async_trait]
impl SegmentIndex for MemoryIndex {
    fn current(&self) -> Option<Arc<dyn Generation>> {
        self.active.read().clone().map(|g| g as Arc<dyn Generation>)
    }

    async fn rebuild(&self, segments: Vec<String>) -> Result<usize> {
        let mut vectorizer = TfIdfVectorizer::new(self.options.max_features);
        let vectors = vectorizer.fit_transform(&segments)?;
        let generation = MemoryGeneration {
            fingerprint: fingerprint(&segments),
            segments: Segment::from_texts(segments, self.options.preview_chars),
            vectors,
            vectorizer,
            metric: self.options.metric,
        };
        let count = generation.segments.len();
        *self.active.write() = Some(Arc::new(generation));
        info!(collection = %self.options.collection, segments = count, "in-memory index rebuilt");
        Ok(count)
    }

    async fn stats(&self) -> StoreStats {
        match self.active.read().as_ref() {
            Some(g) => StoreStats {
                status: StoreStatus::Initialized,
                document_count: g.segments.len(),
                collection: self.options.collection.clone(),
                fingerprint: Some(g.fingerprint.clone()),
                error: None,
            },
            None => StoreStats::not_initialized(&self.options.collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpusqa_core::Error;

    fn corpus() -> Vec<String> {
        vec![
            "Fiber internet offers speeds up to 1 Gbps.".into(),
            "Customer support is available 24/7 by phone.".into(),
            "Cable internet is widely available.".into(),
        ]
    }

    #[tokio::test]
    async fn nearest_segment_for_matching_query() {
        let index = MemoryIndex::new(IndexOptions::default());
        assert_eq!(index.rebuild(corpus()).await.unwrap(), 3);
        let generation = index.current().unwrap();
        let q = generation.vectorizer().transform("fiber speeds").unwrap();
        let hits = generation.query_nearest(&q, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].segment.id, "chunk_0");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn k_larger_than_collection_returns_all() {
        let index = MemoryIndex::new(IndexOptions::default());
        index.rebuild(corpus()).await.unwrap();
        let g = index.current().unwrap();
        let q = g.vectorizer().transform("internet").unwrap();
        assert_eq!(g.query_nearest(&q, 10).await.unwrap().len(), 3);
        assert!(matches!(g.query_nearest(&q, 0).await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_generation() {
        let index = MemoryIndex::new(IndexOptions::default());
        index.rebuild(corpus()).await.unwrap();
        assert!(matches!(index.rebuild(Vec::new()).await, Err(Error::EmptyCorpus)));
        let stats = index.stats().await;
        assert_eq!(stats.status, StoreStatus::Initialized);
        assert_eq!(stats.document_count, 3);
    }

    #[tokio::test]
    async fn empty_index_reports_not_initialized() {
        let index = MemoryIndex::new(IndexOptions::default());
        assert!(index.current().is_none());
        assert_eq!(index.stats().await.status, StoreStatus::NotInitialized);
        assert!(matches!(index.query_nearest(&[1.0], 1).await, Err(Error::StoreUnavailable(_))));
    }
}
