//! Question answering on top of a segment index: retrieval, answer
//! composition, and the collaborators that feed them.

pub mod backend;
pub mod bootstrap;
pub mod composer;
pub mod fetch;
pub mod retriever;
pub mod samples;

pub use backend::OpenAiCompatibleBackend;
pub use bootstrap::{ensure_index, CorpusSource};
pub use composer::{Composer, Composition};
pub use fetch::{HtmlText, HttpFetcher};
pub use retriever::Retriever;
