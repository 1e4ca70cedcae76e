//! Request pipeline: embed, search, build prompt, generate
//!
//! Each request walks the stages strictly in order and stops at the first
//! failure. Nothing is retried and nothing is shared between requests
//! except the provider clients.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::types::{ChatRequest, ChatResult};

/// Stage that calls out to a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Embedding,
    Search,
    Generation,
}

impl Stage {
    /// Attribute an error to this stage. Errors already tagged for the
    /// stage, and timeouts, pass through unchanged.
    fn attribute(self, err: Error) -> Error {
        match (self, err) {
            (Stage::Embedding, err @ Error::Embedding(_))
            | (Stage::Search, err @ Error::Search(_))
            | (Stage::Generation, err @ Error::Generation(_))
            | (_, err @ Error::Timeout(_)) => err,
            (Stage::Embedding, other) => Error::embedding(other.to_string()),
            (Stage::Search, other) => Error::search(other.to_string()),
            (Stage::Generation, other) => Error::generation(other.to_string()),
        }
    }
}

/// Coordinates one chat request across the three providers
pub struct ChatPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
    deadline: Duration,
}

impl ChatPipeline {
    /// Create a pipeline over the given providers
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            top_k: config.top_k,
            deadline: config.request_timeout(),
        }
    }

    /// Answer one chat request.
    ///
    /// Validation happens before any provider is called. The provider
    /// stages run under the request deadline; when it elapses the
    /// in-flight call is dropped, which aborts its HTTP request.
    pub async fn answer(&self, request: &ChatRequest) -> Result<ChatResult> {
        request.validate()?;
        tracing::debug!(query_len = request.query.len(), "Request validated");

        let start = Instant::now();
        let result = match tokio::time::timeout(self.deadline, self.run(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.deadline)),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(chat) => tracing::info!(
                hits = chat.sources.len(),
                answer_len = chat.answer.len(),
                elapsed_ms,
                "Chat completed"
            ),
            Err(err) => tracing::warn!(
                stage = err.stage().unwrap_or("unknown"),
                elapsed_ms,
                "Chat failed: {}",
                err
            ),
        }

        result
    }

    async fn run(&self, request: &ChatRequest) -> Result<ChatResult> {
        let query = request.query.as_str();

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Stage::Embedding.attribute(e))?;
        tracing::debug!(provider = self.embedder.name(), dimensions = vector.len(), "Embedded");

        let hits = self
            .store
            .search(&vector, self.top_k)
            .await
            .map_err(|e| Stage::Search.attribute(e))?;
        tracing::debug!(provider = self.store.name(), hits = hits.len(), "Searched");
        if hits.is_empty() {
            tracing::debug!("No passages found; generating without grounding context");
        }

        let prompt = PromptBuilder::build(query, &hits);
        tracing::debug!(prompt_len = prompt.len(), "Prompt built");

        let model = request.model_override();
        let answer = self
            .llm
            .generate(&prompt, model)
            .await
            .map_err(|e| Stage::Generation.attribute(e))?;
        tracing::debug!(
            provider = self.llm.name(),
            model = model.unwrap_or(self.llm.model()),
            "Generated"
        );

        Ok(ChatResult {
            answer,
            sources: hits,
        })
    }
}
