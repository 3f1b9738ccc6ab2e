use tracing::{info, warn};

use corpusqa_core::config::Settings;
use corpusqa_core::traits::Fetcher;
use corpusqa_core::Result;
use corpusqa_text::TextSplitter;
use corpusqa_vector::IndexStore;

use crate::samples::SAMPLE_CORPUS;

/// Where the active generation came from after [`ensure_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusSource {
    /// An existing persisted generation was loaded.
    Loaded,
    /// Built from the configured source URL.
    Fetched,
    /// Built from the built-in sample corpus.
    Sample,
}

/// Make sure `store` has an active generation.
///
/// Loads the persisted one when possible; otherwise builds from
/// `settings.source.url`, falling back to the sample corpus.
pub async fn ensure_index(
    store: &IndexStore,
    fetcher: &dyn Fetcher,
    settings: &Settings,
) -> Result<CorpusSource> {
    if store.load().await.is_ok() {
        return Ok(CorpusSource::Loaded);
    }
    info!(collection = %settings.storage.collection, "no usable index, building a new one");
    let splitter = TextSplitter::from_settings(&settings.chunking)?;
    let (text, source) = match fetcher.scrape(&settings.source.url).await {
        Some(text) => (text, CorpusSource::Fetched),
        None => {
            warn!(url = %settings.source.url, "source unavailable, using sample corpus");
            (SAMPLE_CORPUS.to_string(), CorpusSource::Sample)
        }
    };
    let count = store.rebuild_from_text(&text, &splitter).await?;
    info!(segments = count, ?source, "index ready");
    Ok(source)
}
