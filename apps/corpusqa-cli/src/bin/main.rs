//! corpusqa - ask questions about an indexed corpus
//!
//! ```bash
//! corpusqa ask "What speed does fiber offer?"
//! corpusqa retrieve "customer support" -k 5
//! corpusqa stats
//! corpusqa rebuild --file ./docs
//! ```
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use corpusqa_assist::samples::SAMPLE_CORPUS;
use corpusqa_assist::{ensure_index, Composer, Composition, HttpFetcher, Retriever};
use corpusqa_cli::{init_tracing, spinner};
use corpusqa_core::config::Config;
use corpusqa_core::corpus::load_corpus;
use corpusqa_core::traits::Fetcher;
use corpusqa_text::TextSplitter;
use corpusqa_vector::{IndexStore, SegmentIndex};

#[derive(Parser)]
#[command(name = "corpusqa")]
#[command(about = "Answer questions from a TF-IDF index of a text corpus")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Override storage.data_dir
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question and print the answer record as JSON
    Ask { question: String },

    /// Show the passages nearest to a query
    Retrieve {
        query: String,

        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Print index statistics as JSON
    Stats,

    /// Rebuild the index. Defaults to the configured source URL.
    Rebuild {
        /// Read the corpus from a .txt file or a directory of them
        #[arg(long, conflicts_with_all = ["url", "sample"])]
        file: Option<PathBuf>,

        /// Fetch the corpus from this URL
        #[arg(long, conflicts_with = "sample")]
        url: Option<String>,

        /// Use the built-in sample corpus
        #[arg(long)]
        sample: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load_from_dir(&cli.config_dir)?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_override("storage.data_dir", dir)?;
    }
    let settings = config.settings()?;
    let store = Arc::new(IndexStore::from_config(&config).await?);
    let fetcher = HttpFetcher::from_settings(&settings.source)?;

    match cli.command {
        Commands::Ask { question } => {
            ensure_index(&store, &fetcher, &settings).await?;
            let composer = Composer::new(
                Retriever::new(store.clone()),
                Composition::from_settings(&settings)?,
                settings.answer,
            );
            let answer = composer.answer(&question).await;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }

        Commands::Retrieve { query, k } => {
            ensure_index(&store, &fetcher, &settings).await?;
            let k = k.unwrap_or(settings.retrieval.default_k);
            let hits = Retriever::new(store.clone()).retrieve(&query, k).await?;
            if hits.is_empty() {
                println!("No results for '{query}'");
            }
            for (i, hit) in hits.iter().enumerate() {
                println!("{}. score={:.4} id={}", i + 1, hit.score, hit.id);
                println!("   {}", hit.content);
            }
        }

        Commands::Stats => {
            if let Err(e) = store.load().await {
                info!(error = %e, "no index loaded");
            }
            println!("{}", serde_json::to_string_pretty(&store.stats().await)?);
        }

        Commands::Rebuild { file, url, sample } => {
            let text = if let Some(path) = file {
                load_corpus(&path)?
            } else if sample {
                SAMPLE_CORPUS.to_string()
            } else {
                let url = url.unwrap_or_else(|| settings.source.url.clone());
                match fetcher.scrape(&url).await {
                    Some(text) => text,
                    None => bail!("could not fetch corpus from {url}"),
                }
            };
            let splitter = TextSplitter::from_settings(&settings.chunking)?;
            let pb = spinner("Rebuilding index...");
            let result = store.rebuild_from_text(&text, &splitter).await;
            pb.finish_and_clear();
            let count = result?;
            println!("Indexed {count} segments into '{}'", settings.storage.collection);
            println!("{}", serde_json::to_string_pretty(&store.stats().await)?);
        }
    }
    Ok(())
}
