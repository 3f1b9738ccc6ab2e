use corpusqa_core::config::Metric;
use corpusqa_core::types::StoreStatus;
use corpusqa_core::Error;
use corpusqa_text::TextSplitter;
use corpusqa_vector::{IndexOptions, IndexStore, MemoryIndex, SegmentIndex};
use tempfile::TempDir;

const CORPUS: &str = "Ziggo offers fiber internet with download speeds up to 1 Gbps.\n\n\
Cable internet packages start at 50 Mbps and include a modem.\n\n\
Customer support is available around the clock by phone and chat.\n\n\
Installation of a new fiber connection usually takes two weeks.\n\n\
Television bundles combine internet with more than 80 channels.";

fn options(collection: &str) -> IndexOptions {
    IndexOptions { collection: collection.to_string(), ..IndexOptions::default() }
}

fn segments() -> Vec<String> {
    TextSplitter::new(80, 10).expect("splitter").split(CORPUS)
}

async fn ranked_ids(index: &dyn SegmentIndex, query: &str, k: usize) -> Vec<String> {
    let generation = index.current().expect("active generation");
    let q = generation.vectorizer().transform(query).expect("transform");
    generation
        .query_nearest(&q, k)
        .await
        .expect("query")
        .into_iter()
        .map(|n| n.segment.id)
        .collect()
}

#[tokio::test]
async fn rebuild_then_query_finds_relevant_segment() {
    let tmp = TempDir::new().expect("tmp");
    let store = IndexStore::open(tmp.path(), options("corpus")).await.expect("open");
    let count = store.rebuild(segments()).await.expect("rebuild");
    assert_eq!(count, 5);

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Initialized);
    assert_eq!(stats.document_count, 5);
    assert!(stats.fingerprint.is_some());

    let generation = store.current().expect("generation");
    let q = generation
        .vectorizer()
        .transform("How fast is the fiber download speed?")
        .expect("transform");
    let hits = generation.query_nearest(&q, 3).await.expect("query");
    assert_eq!(hits.len(), 3);
    assert!(hits[0].segment.text.contains("fiber internet"));
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(hits[0].segment.preview, hits[0].segment.text.chars().take(100).collect::<String>());
}

#[tokio::test]
async fn load_without_any_build_is_unavailable() {
    let tmp = TempDir::new().expect("tmp");
    let store = IndexStore::open(tmp.path(), options("corpus")).await.expect("open");
    assert!(matches!(store.load().await, Err(Error::StoreUnavailable(_))));
    assert_eq!(store.stats().await.status, StoreStatus::NotInitialized);
    assert!(store.current().is_none());
}

#[tokio::test]
async fn second_rebuild_replaces_first_generation() {
    let tmp = TempDir::new().expect("tmp");
    let store = IndexStore::open(tmp.path(), options("corpus")).await.expect("open");
    store.rebuild(segments()).await.expect("first");
    let first_slot = store.active_generation().expect("gen").slot().to_string();

    let smaller = vec!["Only fiber here.".to_string(), "And support there.".to_string()];
    store.rebuild(smaller.clone()).await.expect("second");
    let second = store.active_generation().expect("gen");
    assert_ne!(second.slot(), first_slot);
    assert_eq!(store.stats().await.document_count, 2);

    // A third build goes back to the first slot, overwriting it with a different width.
    store.rebuild(segments()).await.expect("third");
    assert_eq!(store.active_generation().expect("gen").slot(), first_slot);
    assert_eq!(store.stats().await.document_count, 5);
}

#[tokio::test]
async fn failed_rebuild_keeps_previous_generation_queryable() {
    let tmp = TempDir::new().expect("tmp");
    let store = IndexStore::open(tmp.path(), options("corpus")).await.expect("open");
    store.rebuild(segments()).await.expect("rebuild");

    assert!(matches!(store.rebuild(Vec::new()).await, Err(Error::EmptyCorpus)));
    let splitter = TextSplitter::new(50, 5).expect("splitter");
    assert!(matches!(store.rebuild_from_text("  \n\n ", &splitter).await, Err(Error::EmptyCorpus)));

    assert_eq!(store.stats().await.document_count, 5);
    let ids = ranked_ids(&store, "customer support phone", 1).await;
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn reload_in_fresh_store_is_rank_equivalent() {
    let tmp = TempDir::new().expect("tmp");
    let queries = ["fiber speed", "support by phone", "television channels", "modem cable"];
    let mut built = Vec::new();
    {
        let store = IndexStore::open(tmp.path(), options("corpus")).await.expect("open");
        store.rebuild(segments()).await.expect("rebuild");
        for q in queries {
            built.push(ranked_ids(&store, q, 3).await);
        }
    }

    let reopened = IndexStore::open(tmp.path(), options("corpus")).await.expect("reopen");
    reopened.load().await.expect("load");
    let memory = MemoryIndex::new(options("corpus"));
    memory.rebuild(segments()).await.expect("memory rebuild");
    assert_eq!(reopened.stats().await.fingerprint, memory.stats().await.fingerprint);

    for (q, expected) in queries.iter().zip(&built) {
        assert_eq!(&ranked_ids(&reopened, q, 3).await, expected, "query {q}");
        assert_eq!(&ranked_ids(&memory, q, 3).await, expected, "query {q} (memory)");
    }
}

#[tokio::test]
async fn equal_distances_rank_by_source_order() {
    let tmp = TempDir::new().expect("tmp");
    let texts = vec!["fiber".to_string(), "modem".to_string(), "cable".to_string()];
    let store = IndexStore::open(tmp.path(), options("ties")).await.expect("open");
    store.rebuild(texts.clone()).await.expect("rebuild");
    let memory = MemoryIndex::new(options("ties"));
    memory.rebuild(texts).await.expect("memory");

    let generation = store.current().expect("generation");
    let q = generation.vectorizer().transform("fiber").expect("transform");
    let hits = generation.query_nearest(&q, 3).await.expect("query");
    let ids: Vec<_> = hits.iter().map(|n| n.segment.id.as_str()).collect();
    assert_eq!(ids, vec!["chunk_0", "chunk_1", "chunk_2"]);
    assert_eq!(hits[1].distance, hits[2].distance);
    assert_eq!(ranked_ids(&memory, "fiber", 3).await, ids);
}

#[tokio::test]
async fn cosine_metric_ranks_like_memory_index() {
    let tmp = TempDir::new().expect("tmp");
    let opts = IndexOptions { metric: Metric::Cosine, ..options("cosine") };
    let store = IndexStore::open(tmp.path(), opts.clone()).await.expect("open");
    store.rebuild(segments()).await.expect("rebuild");
    let memory = MemoryIndex::new(opts);
    memory.rebuild(segments()).await.expect("memory");
    assert_eq!(
        ranked_ids(&store, "internet installation", 2).await,
        ranked_ids(&memory, "internet installation", 2).await
    );
}

#[tokio::test]
async fn collections_are_independent() {
    let tmp = TempDir::new().expect("tmp");
    let a = IndexStore::open(tmp.path(), options("alpha")).await.expect("open a");
    let b = IndexStore::open(tmp.path(), options("beta")).await.expect("open b");
    a.rebuild(segments()).await.expect("rebuild a");
    assert!(matches!(b.load().await, Err(Error::StoreUnavailable(_))));
}
