use std::sync::Arc;
use tracing::{debug, error, warn};

use corpusqa_core::types::ScoredPassage;
use corpusqa_core::{Error, Result};
use corpusqa_vector::SegmentIndex;

/// Ranks stored segments against a question.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn SegmentIndex>,
}

impl Retriever {
    pub fn new(index: Arc<dyn SegmentIndex>) -> Self {
        Self { index }
    }

    /// Up to `k` passages, best first, scored `1 / (1 + distance)`.
    ///
    /// No active generation, an empty generation, or a question sharing no
    /// term with the vocabulary all give an empty result. Store failures are
    /// logged and also give an empty result. An unfitted vectorizer on a
    /// non-empty generation is an error.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".into()));
        }
        let Some(generation) = self.index.current() else {
            warn!("retrieve called before any index generation was loaded");
            return Ok(Vec::new());
        };
        if generation.document_count() == 0 {
            return Ok(Vec::new());
        }
        let vector = generation.vectorizer().transform(query)?;
        if vector.iter().all(|x| *x == 0.0) {
            debug!(query, "query shares no terms with the vocabulary");
            return Ok(Vec::new());
        }
        let neighbors = match generation.query_nearest(&vector, k).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "nearest-segment query failed");
                return Ok(Vec::new());
            }
        };
        let passages = neighbors
            .into_iter()
            .filter(|n| n.distance.is_finite())
            .map(|n| ScoredPassage {
                score: similarity(n.distance),
                id: n.segment.id,
                content: n.segment.text,
            })
            .collect::<Vec<_>>();
        debug!(query, hits = passages.len(), "retrieved");
        Ok(passages)
    }
}

/// Map a non-negative distance into `(0, 1]`.
pub fn similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}
