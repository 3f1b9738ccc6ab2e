//! Client for any OpenAI-compatible chat completions endpoint.
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use corpusqa_core::config::BackendSettings;
use corpusqa_core::traits::GenerativeBackend;
use corpusqa_core::{Error, Result};

const DEFAULT_MODEL: &str = "mistral-7b-instruct";
const SYSTEM_PROMPT: &str = "You answer questions about a product's documentation. \
Use only the numbered context passages. If they do not contain the answer, say you don't know.";

pub struct OpenAiCompatibleBackend {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Backend(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_settings(settings: &BackendSettings) -> Result<Option<Self>> {
        match settings.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(Some(Self::new(
                endpoint,
                settings.api_key.clone(),
                settings.model.clone(),
                Duration::from_secs(settings.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, question: &str, context_segments: &[String]) -> Value {
        let context = context_segments
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[{}] {s}", i + 1))
            .collect::<Vec<_>>()
            .join("\n\n");
        json!({
            "model": self.model,
            "temperature": 0.1,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("Context:\n{context}\n\nQuestion: {question}"),
                },
            ],
        })
    }
}

/// Text of the first choice in a chat completions response.
fn completion_text(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Backend("response has no completion text".into()))
}

#[async_trait]
impl GenerativeBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, question: &str, context_segments: &[String]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&self.request_body(question, context_segments));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Backend(format!("{url} connection failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("{url} returned {status}: {text}")));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::Backend(format!("invalid response: {e}")))?;
        debug!(model = %self.model, "completion received");
        completion_text(&body)
    }
}
