//! Application state for the chat server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::ChatPipeline;
use crate::providers::{
    EmbeddingProvider, LlmProvider, OllamaProvider, QdrantStore, VectorStoreProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Request pipeline over the configured providers
    pipeline: ChatPipeline,
}

impl AppState {
    /// Create state backed by Ollama and Qdrant
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing chat application state...");

        let (embedder, llm) = OllamaProvider::new(&config)?.split();
        tracing::info!(
            "Ollama client initialized (embeddings: {}, generation: {})",
            config.embeddings.model,
            config.llm.model
        );

        let store = QdrantStore::new(&config.vector_db, &config.pipeline)?;
        tracing::info!("Qdrant store initialized (collection: {})", config.vector_db.collection);

        Ok(Self::with_providers(
            config,
            Arc::new(embedder),
            Arc::new(store),
            Arc::new(llm),
        ))
    }

    /// Create state over explicit providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let pipeline = ChatPipeline::new(embedder, store, llm, &config.pipeline);
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the request pipeline
    pub fn pipeline(&self) -> &ChatPipeline {
        &self.inner.pipeline
    }
}
