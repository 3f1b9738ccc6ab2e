//! Shared setup for the command-line binaries.
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = "{spinner:.green} [{elapsed_precise}] {msg}";
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// First `n` characters of `text` on one line.
pub fn preview(text: &str, n: usize) -> String {
    text.chars().take(n).collect::<String>().replace('\n', " ")
}
