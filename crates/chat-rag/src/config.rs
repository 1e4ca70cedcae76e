//! Configuration for the chat service
//!
//! Everything here is read once at startup and handed to components by
//! constructor; nothing re-reads configuration per request.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding provider configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Generation provider configuration
    pub llm: LlmConfig,
    /// Request pipeline configuration
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Full embedding endpoint URL
    pub url: String,
    /// Embedding model name
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/embeddings".to_string(),
            model: "nomic-embed-text".to_string(),
        }
    }
}

/// Vector index (Qdrant) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Qdrant base URL
    pub base_url: String,
    /// Collection holding the passages
    pub collection: String,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6333".to_string(),
            collection: "documents".to_string(),
        }
    }
}

/// Generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full generation endpoint URL
    pub url: String,
    /// Default generation model name
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            model: "gemma:2b".to_string(),
        }
    }
}

/// Request pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of passages requested from the vector index
    pub top_k: usize,
    /// Deadline for the whole pipeline of one request, in seconds
    pub request_timeout_secs: u64,
    /// TCP connect timeout for provider connections, in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

impl PipelineConfig {
    /// Per-request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Provider connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl RagConfig {
    /// Load configuration: defaults, then an optional TOML file, then
    /// environment overrides. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; missing sections and keys fall back to defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("Invalid config: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_db.base_url = url;
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            self.vector_db.collection = collection;
        }
        if let Some(url) = lookup("OLLAMA_EMBED_URL") {
            self.embeddings.url = url;
        }
        if let Some(model) = lookup("EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(url) = lookup("OLLAMA_GENERATE_URL") {
            self.llm.url = url;
        }
        if let Some(model) = lookup("GENERATE_MODEL") {
            self.llm.model = model;
        }
        if let Some(top_k) = lookup("RAG_TOP_K") {
            self.pipeline.top_k = parse_var("RAG_TOP_K", &top_k)?;
        }
        if let Some(secs) = lookup("RAG_TIMEOUT_SECS") {
            self.pipeline.request_timeout_secs = parse_var("RAG_TIMEOUT_SECS", &secs)?;
        }
        Ok(())
    }

    /// Check invariants that every component relies on
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.top_k == 0 {
            return Err(Error::config("pipeline.top_k must be at least 1"));
        }
        if self.pipeline.request_timeout_secs == 0 {
            return Err(Error::config("pipeline.request_timeout_secs must be positive"));
        }
        if self.pipeline.connect_timeout_secs == 0 {
            return Err(Error::config("pipeline.connect_timeout_secs must be positive"));
        }

        let required = [
            ("embeddings.url", &self.embeddings.url),
            ("embeddings.model", &self.embeddings.model),
            ("vector_db.base_url", &self.vector_db.base_url),
            ("vector_db.collection", &self.vector_db.collection),
            ("llm.url", &self.llm.url),
            ("llm.model", &self.llm.model),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} has invalid value '{}'", key, value)))
}
