use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A vocabulary fit was attempted on zero segments.
    #[error("Cannot fit a vocabulary on an empty corpus")]
    EmptyCorpus,

    /// Every term in the corpus was filtered out (stop-words, single characters).
    #[error("Corpus produced an empty vocabulary")]
    EmptyVocabulary,

    #[error("Vectorizer has not been fitted")]
    UnfittedModel,

    #[error("No active collection: {0}")]
    StoreUnavailable(String),

    #[error("Rebuild failed: {0}")]
    RebuildFailure(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Generative backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
