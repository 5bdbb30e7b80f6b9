//! Application configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default provider backend.
const DEFAULT_PROVIDER: &str = "openai";
/// Default reasoning model.
const DEFAULT_MODEL: &str = "gpt-5-mini-2025-08-07";
/// Default chunk size in characters.
const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default chunk overlap in characters.
const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default number of retrieval results per clinical turn.
const DEFAULT_TOP_K: usize = 3;
/// Default maximum executor round-trips.
const DEFAULT_MAX_ITERATIONS: usize = 10;
/// Default executor wall-time budget in seconds.
const DEFAULT_MAX_WALL_TIME_SECS: u64 = 60;
/// Default embedding batch size.
const DEFAULT_EMBED_BATCH_SIZE: usize = 100;
/// Default maximum tokens per model response.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Configuration for the assistant.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider backend name (currently only `"openai"`).
    pub provider: String,
    /// API key for the reasoning backend.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Reasoning model identifier.
    pub model: String,
    /// API key for the web search provider. `None` disables web search.
    pub search_api_key: Option<String>,
    /// Path to the patient records JSON file.
    pub patient_db_path: Option<PathBuf>,
    /// Path to the reference corpus text document.
    pub corpus_path: Option<PathBuf>,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Chunk overlap in characters. Must be less than `chunk_size`.
    pub chunk_overlap: usize,
    /// Retrieval results per clinical turn.
    pub top_k: usize,
    /// Maximum executor round-trips per turn.
    pub max_iterations: usize,
    /// Soft wall-time budget for one executor run.
    pub max_wall_time: Duration,
    /// Chunks per embedding batch during ingestion.
    pub embed_batch_size: usize,
    /// Maximum tokens per model response.
    pub max_tokens: u32,
}

impl Settings {
    /// Creates a new builder for `Settings`.
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    search_api_key: Option<String>,
    patient_db_path: Option<PathBuf>,
    corpus_path: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    max_iterations: Option<usize>,
    max_wall_time: Option<Duration>,
    embed_batch_size: Option<usize>,
    max_tokens: Option<u32>,
}

impl SettingsBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("AFTERCARE_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("AFTERCARE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("AFTERCARE_BASE_URL"))
                .ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("AFTERCARE_MODEL").ok();
        }
        if self.search_api_key.is_none() {
            self.search_api_key = std::env::var("TAVILY_API_KEY").ok();
        }
        if self.patient_db_path.is_none() {
            self.patient_db_path = std::env::var("AFTERCARE_PATIENT_DB")
                .ok()
                .map(PathBuf::from);
        }
        if self.corpus_path.is_none() {
            self.corpus_path = std::env::var("AFTERCARE_CORPUS").ok().map(PathBuf::from);
        }
        if self.chunk_size.is_none() {
            self.chunk_size = std::env::var("AFTERCARE_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.chunk_overlap.is_none() {
            self.chunk_overlap = std::env::var("AFTERCARE_CHUNK_OVERLAP")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("AFTERCARE_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_iterations.is_none() {
            self.max_iterations = std::env::var("AFTERCARE_MAX_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the provider backend name.
    #[must_use]
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the reasoning model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the web search API key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the patient records path.
    #[must_use]
    pub fn patient_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.patient_db_path = Some(path.into());
        self
    }

    /// Sets the reference corpus path.
    #[must_use]
    pub fn corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = Some(path.into());
        self
    }

    /// Sets the chunk size.
    #[must_use]
    pub const fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n);
        self
    }

    /// Sets the chunk overlap.
    #[must_use]
    pub const fn chunk_overlap(mut self, n: usize) -> Self {
        self.chunk_overlap = Some(n);
        self
    }

    /// Sets the retrieval top-k.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Sets the maximum executor iterations.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the executor wall-time budget.
    #[must_use]
    pub const fn max_wall_time(mut self, duration: Duration) -> Self {
        self.max_wall_time = Some(duration);
        self
    }

    /// Sets the embedding batch size.
    #[must_use]
    pub const fn embed_batch_size(mut self, n: usize) -> Self {
        self.embed_batch_size = Some(n);
        self
    }

    /// Sets the maximum tokens per model response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Builds the [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<Settings, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(Settings {
            provider: self.provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search_api_key: self.search_api_key,
            patient_db_path: self.patient_db_path,
            corpus_path: self.corpus_path,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            max_wall_time: self
                .max_wall_time
                .unwrap_or(Duration::from_secs(DEFAULT_MAX_WALL_TIME_SECS)),
            embed_batch_size: self.embed_batch_size.unwrap_or(DEFAULT_EMBED_BATCH_SIZE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}
