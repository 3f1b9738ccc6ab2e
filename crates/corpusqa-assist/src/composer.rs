use tracing::{error, info, warn};

use corpusqa_core::config::{AnswerSettings, Settings};
use corpusqa_core::traits::GenerativeBackend;
use corpusqa_core::types::Answer;
use corpusqa_core::Result;

use crate::backend::OpenAiCompatibleBackend;
use crate::retriever::Retriever;

pub const NO_RELEVANT_INFORMATION: &str =
    "I'm sorry, I couldn't find relevant information about your question.";
const FALLBACK_PREFIX: &str = "Based on the documentation: ";
/// Passages retrieved per question.
pub const ANSWER_K: usize = 3;

/// How retrieved passages become an answer. Chosen once, at construction.
pub enum Composition {
    Generative(Box<dyn GenerativeBackend>),
    Fallback,
}

impl Composition {
    /// Generative when `backend.endpoint` is configured, fallback otherwise.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(match OpenAiCompatibleBackend::from_settings(&settings.backend)? {
            Some(backend) => Self::Generative(Box::new(backend)),
            None => Self::Fallback,
        })
    }
}

pub struct Composer {
    retriever: Retriever,
    composition: Composition,
    settings: AnswerSettings,
}

impl Composer {
    pub fn new(retriever: Retriever, composition: Composition, settings: AnswerSettings) -> Self {
        match &composition {
            Composition::Generative(b) => {
                info!(backend = b.name(), "answers composed by generative backend");
            }
            Composition::Fallback => info!("answers composed from retrieved text"),
        }
        Self { retriever, composition, settings }
    }

    /// Answer `question`. Never fails: internal errors become an unsuccessful record.
    pub async fn answer(&self, question: &str) -> Answer {
        match self.compose(question).await {
            Ok((answer, sources)) => Answer {
                question: question.to_string(),
                answer,
                sources,
                success: true,
            },
            Err(e) => {
                error!(error = %e, "error answering question");
                Answer {
                    question: question.to_string(),
                    answer: format!("Error processing question: {e}"),
                    sources: Vec::new(),
                    success: false,
                }
            }
        }
    }

    async fn compose(&self, question: &str) -> Result<(String, Vec<String>)> {
        let passages = self.retriever.retrieve(question, ANSWER_K).await?;
        if passages.is_empty() {
            return Ok((NO_RELEVANT_INFORMATION.to_string(), Vec::new()));
        }
        let sources: Vec<String> = passages.into_iter().map(|p| p.content).collect();
        if let Composition::Generative(backend) = &self.composition {
            match backend.generate(question, &sources).await {
                Ok(text) => return Ok((text, sources)),
                Err(e) => warn!(
                    backend = backend.name(),
                    error = %e,
                    "backend failed, using fallback answer"
                ),
            }
        }
        Ok((fallback_answer(&sources, &self.settings), sources))
    }
}

/// Leading passages joined by spaces, cut to `max_answer_chars` characters.
pub fn fallback_answer(sources: &[String], settings: &AnswerSettings) -> String {
    let combined = sources
        .iter()
        .take(settings.context_segments)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let excerpt: String = combined.chars().take(settings.max_answer_chars).collect();
    format!("{FALLBACK_PREFIX}{excerpt}...")
}
