//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for prompt completion
///
/// Implementations:
/// - `OllamaLlm`: Ollama generate endpoint (gemma, mistral, phi3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt, optionally with a model other than the default.
    ///
    /// Failures are `Error::Generation`.
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the default model
    fn model(&self) -> &str;
}
