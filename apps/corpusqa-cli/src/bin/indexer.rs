//! corpusqa-init - build the index once and smoke-test retrieval.
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use corpusqa_assist::samples::EXTENDED_SAMPLE_CORPUS;
use corpusqa_assist::{HttpFetcher, Retriever};
use corpusqa_cli::{init_tracing, preview, spinner};
use corpusqa_core::config::Config;
use corpusqa_core::traits::Fetcher;
use corpusqa_text::TextSplitter;
use corpusqa_vector::{IndexStore, SegmentIndex};

const SMOKE_QUESTIONS: [&str; 4] = [
    "What internet speeds do you offer?",
    "How much does internet cost?",
    "Do you have 5G coverage?",
    "What is your customer support phone number?",
];

#[derive(Parser)]
#[command(name = "corpusqa-init")]
#[command(about = "Initialize the corpus index and check retrieval")]
struct Args {
    /// Page to index (defaults to source.url)
    #[arg(long)]
    url: Option<String>,

    /// Index the built-in sample corpus instead of fetching
    #[arg(long)]
    test_only: bool,

    /// Storage directory (defaults to storage.data_dir)
    #[arg(long)]
    data_dir: Option<String>,

    /// Maximum characters per segment
    #[arg(long, default_value_t = 500)]
    chunk_size: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("initialization failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = Config::load()?;
    if let Some(dir) = &args.data_dir {
        config = config.with_override("storage.data_dir", dir)?;
    }
    let mut settings = config.settings()?;
    settings.chunking.chunk_size = args.chunk_size;
    if settings.chunking.overlap >= args.chunk_size {
        settings.chunking.overlap = args.chunk_size / 5;
    }
    let splitter = TextSplitter::from_settings(&settings.chunking)?;
    let store = IndexStore::from_config(&config).await?;

    let text = if args.test_only {
        info!("using the built-in sample corpus");
        EXTENDED_SAMPLE_CORPUS.to_string()
    } else {
        let url = args.url.unwrap_or_else(|| settings.source.url.clone());
        let fetcher = HttpFetcher::from_settings(&settings.source)?;
        match fetcher.scrape(&url).await {
            Some(text) => text,
            None => {
                error!(url = %url, "could not fetch corpus, aborting");
                return Ok(false);
            }
        }
    };

    let pb = spinner("Building index...");
    let built = store.rebuild_from_text(&text, &splitter).await;
    pb.finish_and_clear();
    built.context("index build failed")?;

    let stats = store.stats().await;
    info!(stats = %serde_json::to_string(&stats)?, "index created");

    let retriever = Retriever::new(std::sync::Arc::new(store));
    for question in SMOKE_QUESTIONS {
        println!("\nQuestion: {question}");
        let results = retriever.retrieve(question, 2).await?;
        if results.is_empty() {
            warn!(question, "no results found");
            continue;
        }
        for (i, result) in results.iter().enumerate() {
            println!("  Result {} (score: {:.3}):", i + 1, result.score);
            println!("    {}...", preview(&result.content, 100));
        }
    }

    info!(db = %config.lancedb_dir()?.display(), "initialization complete");
    Ok(true)
}
