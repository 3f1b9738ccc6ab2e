use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{error, info, warn};

use corpusqa_core::config::SourceSettings;
use corpusqa_core::traits::Fetcher;
use corpusqa_core::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Reduces an HTML document to its visible text.
pub struct HtmlText {
    hidden: Regex,
    comments: Regex,
    tags: Regex,
    spaces: Regex,
}

impl HtmlText {
    pub fn new() -> Result<Self> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| Error::InvalidInput(e.to_string()));
        Ok(Self {
            hidden: compile(concat!(
                r"(?is)<(script|style|noscript|template)\b[^>]*>",
                r".*?</(script|style|noscript|template)\s*>"
            ))?,
            comments: compile(r"(?s)<!--.*?-->")?,
            tags: compile(r"(?s)<[^>]*>")?,
            spaces: compile(r"\s+")?,
        })
    }

    pub fn extract(&self, html: &str) -> String {
        let text = self.hidden.replace_all(html, " ");
        let text = self.comments.replace_all(&text, " ");
        let text = self.tags.replace_all(&text, " ");
        let text = decode_entities(&text);
        self.spaces.replace_all(&text, " ").trim().to_string()
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&euro;", "€")
        .replace("&amp;", "&")
}

/// Fetches a page over HTTP and extracts its text.
pub struct HttpFetcher {
    client: reqwest::Client,
    html: HtmlText,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch(format!("http client: {e}")))?;
        Ok(Self { client, html: HtmlText::new()? })
    }

    pub fn from_settings(settings: &SourceSettings) -> Result<Self> {
        Self::new(Duration::from_secs(settings.timeout_secs))
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Fetch(e.to_string()))?;
        resp.text().await.map_err(|e| Error::Fetch(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn scrape(&self, url: &str) -> Option<String> {
        info!(url, "fetching corpus page");
        let page = match self.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                error!(url, error = %e, "fetch failed");
                return None;
            }
        };
        let text = self.html.extract(&page);
        if text.is_empty() {
            warn!(url, "page has no text content");
            return None;
        }
        info!(url, chars = text.chars().count(), "extracted page text");
        Some(text)
    }
}
