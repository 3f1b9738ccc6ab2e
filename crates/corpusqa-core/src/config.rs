//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_STORAGE__DATA_DIR`). Every key has
//! a default, so running without any config file is valid.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `config.toml` and the env-specific overlay from `base`.
    pub fn load_from_dir(base: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base.join("config.toml")));
        let overlay = match env_name.as_str() {
            "dev" | "development" => Some("config.dev.toml"),
            "prod" | "production" => Some("config.prod.toml"),
            "test" | "testing" => Some("config.test.toml"),
            _ => None,
        };
        if let Some(file) = overlay {
            figment = figment.merge(Toml::file(base.join(file)));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base.to_path_buf() };
        config.settings()?;
        Ok(config)
    }

    /// Build a config from an explicit figment, e.g. in tests.
    pub fn from_figment(figment: Figment, base_dir: &Path) -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment),
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Layer `key = value` (dotted path) over everything loaded so far.
    pub fn with_override<V: Serialize>(self, key: &str, value: V) -> Result<Self> {
        let config = Self {
            figment: self.figment.merge(Serialized::default(key, value)),
            base_dir: self.base_dir,
        };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Directory holding the LanceDB database, resolved against the config base.
    pub fn lancedb_dir(&self) -> Result<PathBuf> {
        let settings = self.settings()?;
        Ok(resolve_with_base(&self.base_dir, &settings.storage.data_dir).join("lancedb"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub chunking: ChunkingSettings,
    pub vectorizer: VectorizerSettings,
    pub retrieval: RetrievalSettings,
    pub answer: AnswerSettings,
    pub source: SourceSettings,
    pub backend: BackendSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.vectorizer.max_features == 0 {
            return Err(Error::InvalidConfig("vectorizer.max_features must be positive".into()));
        }
        if self.retrieval.default_k == 0 {
            return Err(Error::InvalidConfig("retrieval.default_k must be positive".into()));
        }
        if self.storage.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("storage.collection must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: String,
    pub collection: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { data_dir: "./data".to_string(), collection: "corpus".to_string() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 100 }
    }
}

impl ChunkingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerSettings {
    pub max_features: usize,
    pub preview_chars: usize,
}

impl Default for VectorizerSettings {
    fn default() -> Self {
        Self { max_features: 1000, preview_chars: 100 }
    }
}

/// Distance used for nearest-segment search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Squared Euclidean distance.
    #[default]
    L2,
    /// `1 - cosine similarity`.
    Cosine,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub metric: Metric,
    pub default_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { metric: Metric::L2, default_k: 3 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    pub context_segments: usize,
    pub max_answer_chars: usize,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self { context_segments: 2, max_answer_chars: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self { url: "https://ziggo.nl/internet".to_string(), timeout_secs: 10 }
    }
}

/// Optional generative backend. Enabled only when `endpoint` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self { endpoint: None, api_key: None, model: None, timeout_secs: 60 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
