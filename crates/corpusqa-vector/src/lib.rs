//! Segment indexes: the persisted LanceDB store and an in-memory equivalent.
//!
//! Both hold one active [`Generation`] at a time. A rebuild fits a fresh
//! vectorizer on the full segment set, writes the new generation, then swaps
//! it in with a single assignment; readers clone the `Arc` and keep a
//! consistent vocabulary and vector set for the duration of their query.

pub mod memory;
pub mod schema;
pub mod search;
pub mod store;
pub mod table;
pub mod writer;

use async_trait::async_trait;
use std::sync::Arc;

use corpusqa_core::config::{Metric, Settings};
use corpusqa_core::types::{Neighbor, StoreStats};
use corpusqa_core::Result;
use corpusqa_embed::TfIdfVectorizer;

pub use memory::MemoryIndex;
pub use store::{IndexGeneration, IndexStore};

/// A read-only, fully built index generation.
#[async_trait]
pub trait Generation: Send + Sync {
    /// The vectorizer fit on exactly this generation's segments.
    fn vectorizer(&self) -> &TfIdfVectorizer;
    fn document_count(&self) -> usize;
    fn fingerprint(&self) -> &str;
    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

#[async_trait]
pub trait SegmentIndex: Send + Sync {
    /// The active generation, if any.
    fn current(&self) -> Option<Arc<dyn Generation>>;
    /// Replace the active generation with one built from `segments`.
    /// Returns the number of indexed segments.
    async fn rebuild(&self, segments: Vec<String>) -> Result<usize>;
    async fn stats(&self) -> StoreStats;

    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        match self.current() {
            Some(generation) => generation.query_nearest(vector, k).await,
            None => Err(corpusqa_core::Error::StoreUnavailable("no active generation".into())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub collection: String,
    pub max_features: usize,
    pub preview_chars: usize,
    pub metric: Metric,
}

impl IndexOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            collection: settings.storage.collection.clone(),
            max_features: settings.vectorizer.max_features,
            preview_chars: settings.vectorizer.preview_chars,
            metric: settings.retrieval.metric,
        }
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// blake3 digest of the ordered segment texts.
pub fn fingerprint<S: AsRef<str>>(texts: &[S]) -> String {
    let mut hasher = blake3::Hasher::new();
    for text in texts {
        let text = text.as_ref();
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Distance under `metric`: squared Euclidean for L2, `1 - cos` for cosine.
///
/// Cosine against a zero vector is undefined and yields NaN.
pub fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        Metric::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if na == 0.0 || nb == 0.0 {
                f32::NAN
            } else {
                1.0 - dot / (na * nb)
            }
        }
    }
}

/// Ascending distance, ties by source position.
pub fn sort_neighbors(hits: &mut [Neighbor]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.segment.seq.cmp(&b.segment.seq)));
}

pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(corpusqa_core::Error::InvalidInput("k must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_order_and_boundaries() {
        assert_eq!(fingerprint(&["a", "b"]), fingerprint(&["a", "b"]));
        assert_ne!(fingerprint(&["a", "b"]), fingerprint(&["b", "a"]));
        assert_ne!(fingerprint(&["ab", ""]), fingerprint(&["a", "b"]));
    }

    #[test]
    fn distances_follow_metric_definitions() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!((distance(Metric::L2, &a, &b) - 2.0).abs() < 1e-6);
        assert!((distance(Metric::Cosine, &a, &b) - 1.0).abs() < 1e-6);
        assert!(distance(Metric::Cosine, &a, &a).abs() < 1e-6);
        assert!(distance(Metric::Cosine, &a, &[0.0, 0.0]).is_nan());
    }
}
