//! Collaborator seams: where page text comes from and who composes answers.

use async_trait::async_trait;

use crate::error::Result;

/// Produces the plain corpus text behind a URL. `None` means no corpus is available.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn scrape(&self, url: &str) -> Option<String>;
}

/// Optional answer-composition backend (a generative language model).
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;
    async fn generate(&self, question: &str, context_segments: &[String]) -> Result<String>;
}
