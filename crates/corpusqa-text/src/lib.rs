//! corpusqa-text
//!
//! Text handling shared by indexing and querying: the boundary-aware
//! recursive splitter that turns a corpus into segments, and the tantivy
//! analyzer that turns text into vocabulary terms.
pub mod analyzer;
pub mod splitter;

pub use analyzer::TermAnalyzer;
pub use splitter::{TextSpan, TextSplitter};
