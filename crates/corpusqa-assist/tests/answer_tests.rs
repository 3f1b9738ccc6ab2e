use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use corpusqa_assist::composer::NO_RELEVANT_INFORMATION;
use corpusqa_assist::samples::EXTENDED_SAMPLE_CORPUS;
use corpusqa_assist::{ensure_index, Composer, Composition, CorpusSource, Retriever};
use corpusqa_core::config::{AnswerSettings, Settings};
use corpusqa_core::traits::Fetcher;
use corpusqa_core::types::StoreStatus;
use corpusqa_text::TextSplitter;
use corpusqa_vector::{IndexOptions, IndexStore, SegmentIndex};

struct Offline;

#[async_trait]
impl Fetcher for Offline {
    async fn scrape(&self, _url: &str) -> Option<String> {
        None
    }
}

struct Fixed(&'static str);

#[async_trait]
impl Fetcher for Fixed {
    async fn scrape(&self, _url: &str) -> Option<String> {
        Some(self.0.to_string())
    }
}

async fn store_in(dir: &TempDir) -> Arc<IndexStore> {
    Arc::new(IndexStore::open(dir.path(), IndexOptions::default()).await.expect("open"))
}

#[tokio::test]
async fn bootstrap_prefers_loaded_then_fetched_then_sample() {
    let tmp = TempDir::new().expect("tmp");
    let settings = Settings::default();

    let store = store_in(&tmp).await;
    let source = ensure_index(&store, &Offline, &settings).await.expect("bootstrap");
    assert_eq!(source, CorpusSource::Sample);
    assert_eq!(store.stats().await.status, StoreStatus::Initialized);

    let restarted = store_in(&tmp).await;
    let source = ensure_index(&restarted, &Fixed("unused"), &settings).await.expect("bootstrap");
    assert_eq!(source, CorpusSource::Loaded);

    let other = TempDir::new().expect("tmp");
    let fresh = store_in(&other).await;
    let source = ensure_index(&fresh, &Fixed("Fiber internet reaches 1 Gbps."), &settings)
        .await
        .expect("bootstrap");
    assert_eq!(source, CorpusSource::Fetched);
    assert_eq!(fresh.stats().await.document_count, 1);
}

#[tokio::test]
async fn answers_from_extended_sample() {
    let tmp = TempDir::new().expect("tmp");
    let store = store_in(&tmp).await;
    let splitter = TextSplitter::new(500, 100).expect("splitter");
    let count = store.rebuild_from_text(EXTENDED_SAMPLE_CORPUS, &splitter).await.expect("rebuild");
    assert!(count > 1);

    let retriever = Retriever::new(store.clone());
    let hits = retriever
        .retrieve("What is your customer support phone number?", 2)
        .await
        .expect("retrieve");
    assert!(!hits.is_empty());
    assert!(hits[0].content.contains("+31"));
    assert!(hits.iter().all(|h| h.score > 0.0 && h.score <= 1.0));

    let composer = Composer::new(retriever, Composition::Fallback, AnswerSettings::default());
    let answer = composer.answer("How much does the Elite package cost?").await;
    assert!(answer.success);
    assert!(answer.answer.starts_with("Based on the documentation: "));
    assert!(answer.sources.iter().any(|s| s.contains("Elite")));

    let answer = composer.answer("zebra xylophone").await;
    assert!(answer.success);
    assert_eq!(answer.answer, NO_RELEVANT_INFORMATION);
}

#[tokio::test]
async fn fiber_question_ranks_fiber_segment_first() {
    let tmp = TempDir::new().expect("tmp");
    let store = store_in(&tmp).await;
    let segments = vec![
        "Fiber internet up to 1000 Mbps.".to_string(),
        "Customer support available 24/7 by phone.".to_string(),
    ];
    store.rebuild(segments).await.expect("rebuild");
    let retriever = Retriever::new(store.clone());
    let question = "What speed does fiber offer?";

    let top = retriever.retrieve(question, 1).await.expect("retrieve");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].content, "Fiber internet up to 1000 Mbps.");

    let both = retriever.retrieve(question, 2).await.expect("retrieve");
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].content, top[0].content);
    assert!(top[0].score > both[1].score);
    // The support segment shares no term with the question: squared distance 2.
    assert!((both[1].score - 1.0 / 3.0).abs() < 1e-6);
}

#[tokio::test]
async fn answers_before_any_index_are_not_errors() {
    let tmp = TempDir::new().expect("tmp");
    let store = store_in(&tmp).await;
    let composer =
        Composer::new(Retriever::new(store), Composition::Fallback, AnswerSettings::default());
    let answer = composer.answer("What speed does fiber offer?").await;
    assert!(answer.success);
    assert_eq!(answer.answer, NO_RELEVANT_INFORMATION);
    assert!(answer.sources.is_empty());
}
