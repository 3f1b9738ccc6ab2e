//! Domain types shared by the chunking, indexing and answering crates.

use serde::{Deserialize, Serialize};

pub type SegmentId = String;

/// A chunk of the source corpus that is independently indexed.
///
/// - `id`: identifier unique within one index generation (`chunk_<seq>`)
/// - `seq`: position of the segment in source order
/// - `text`: the chunk content
/// - `preview`: bounded-length excerpt stored as lightweight metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub seq: usize,
    pub text: String,
    pub preview: String,
}

impl Segment {
    pub fn new(seq: usize, text: impl Into<String>, preview_chars: usize) -> Self {
        let text = text.into();
        let preview = text.chars().take(preview_chars).collect();
        Self { id: segment_id(seq), seq, text, preview }
    }

    /// Build the ordered segments of one generation from chunk texts.
    pub fn from_texts<I, S>(texts: I, preview_chars: usize) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(seq, text)| Self::new(seq, text, preview_chars))
            .collect()
    }
}

pub fn segment_id(seq: usize) -> SegmentId {
    format!("chunk_{seq}")
}

/// A stored segment together with its distance to a query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub segment: Segment,
    pub distance: f32,
}

/// A retrieved passage. `score` lies in `(0, 1]`, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub id: SegmentId,
    pub content: String,
    pub score: f32,
}

/// The structured record every question produces, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    NotInitialized,
    Initialized,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub status: StoreStatus,
    pub document_count: usize,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreStats {
    pub fn not_initialized(collection: &str) -> Self {
        Self {
            status: StoreStatus::NotInitialized,
            document_count: 0,
            collection: collection.to_string(),
            fingerprint: None,
            error: None,
        }
    }
}
