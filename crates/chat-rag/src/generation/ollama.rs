//! Ollama client for query embedding and answer generation

use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig, PipelineConfig};
use crate::error::{Error, Result};

use super::stream::{collect_answer, decode_lines, decode_single, ResponseMode};

/// Ollama API client.
///
/// No retries: every call is attempted once and failures surface to the
/// caller. There is no overall request timeout here either; the pipeline
/// deadline bounds each call and cancels it by dropping the future.
pub struct OllamaClient {
    /// HTTP client (shared connection pool)
    client: Client,
    embed_url: String,
    embed_model: String,
    generate_url: String,
    generate_model: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Embedding response in either of the two shapes providers use
#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    error: Option<String>,
}

impl EmbedResponse {
    fn into_vector(self) -> Result<Vec<f32>> {
        match (self.embedding, self.embeddings) {
            (Some(vector), _) if !vector.is_empty() => Ok(vector),
            (_, Some(vectors)) => vectors
                .into_iter()
                .next()
                .filter(|vector| !vector.is_empty())
                .ok_or_else(|| Error::embedding("'embeddings' is empty")),
            _ => Err(match self.error {
                Some(reason) => Error::embedding(format!("provider error: {}", reason)),
                None => Error::embedding("response has neither 'embedding' nor 'embeddings'"),
            }),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(
        embeddings: &EmbeddingConfig,
        llm: &LlmConfig,
        pipeline: &PipelineConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(pipeline.connect_timeout())
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            embed_url: embeddings.url.clone(),
            embed_model: embeddings.model.clone(),
            generate_url: llm.url.clone(),
            generate_model: llm.model.clone(),
        })
    }

    /// Default generation model
    pub fn generate_model(&self) -> &str {
        &self.generate_model
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::embedding("text to embed must not be empty"));
        }

        let request = EmbedRequest {
            model: &self.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.embed_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("HTTP {} - {}", status, body)));
        }

        let body = response.text().await.map_err(|e| {
            Error::embedding(format!("Failed to read response: {}", e.without_url()))
        })?;
        let embed_response: EmbedResponse = serde_json::from_str(&body).map_err(|e| {
            Error::embedding(format!(
                "Failed to parse embedding response: {} (body: {})",
                e,
                excerpt(&body)
            ))
        })?;

        let vector = embed_response.into_vector()?;
        tracing::debug!(dimensions = vector.len(), model = %self.embed_model, "Query embedded");
        Ok(vector)
    }

    /// Generate an answer for a prompt.
    ///
    /// `model` overrides the configured generation model.
    pub async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        let model = model.unwrap_or(&self.generate_model);
        let request = GenerateRequest { model, prompt };

        tracing::debug!("Generating answer with model: {}", model);

        let response = self
            .client
            .post(&self.generate_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!("HTTP {} - {}", status, body)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        match ResponseMode::from_content_type(content_type) {
            ResponseMode::Single => {
                let body = response.bytes().await.map_err(|e| {
                    Error::generation(format!("Failed to read response: {}", e.without_url()))
                })?;
                // Some servers label NDJSON as plain JSON
                decode_single(&body).or_else(|_| decode_lines(&body))
            }
            ResponseMode::Stream => collect_answer(response.bytes_stream()).await,
        }
    }
}

/// Leading part of a provider body, cut on a char boundary
fn excerpt(body: &str) -> &str {
    const MAX_LEN: usize = 256;
    match body.char_indices().nth(MAX_LEN) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
