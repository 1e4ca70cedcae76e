//! Qdrant vector search provider (REST API)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::config::{PipelineConfig, VectorDbConfig};
use crate::error::{Error, Result};
use crate::types::Hit;

use super::vector_store::VectorStoreProvider;

/// Qdrant collection searched over HTTP
pub struct QdrantStore {
    client: Client,
    search_url: String,
    collection: String,
}

#[derive(serde::Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    with_vectors: bool,
}

#[derive(serde::Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(serde::Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f64,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

impl ScoredPoint {
    fn into_hit(self) -> Hit {
        let field = |key: &str| {
            self.payload
                .as_ref()
                .and_then(|payload| payload.get(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Hit {
            id: point_id_to_string(&self.id),
            score: self.score,
            text: field("text"),
            source: field("source"),
        }
    }
}

/// Qdrant ids are unsigned integers or UUID strings
fn point_id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl QdrantStore {
    /// Create a new Qdrant store for the configured collection
    pub fn new(config: &VectorDbConfig, pipeline: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(pipeline.connect_timeout())
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            search_url: format!(
                "{}/collections/{}/points/search",
                config.base_url.trim_end_matches('/'),
                config.collection
            ),
            collection: config.collection.clone(),
        })
    }

    /// Search endpoint URL
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantStore {
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<Hit>> {
        if query_embedding.is_empty() {
            return Err(Error::search("query vector must not be empty"));
        }
        if top_k == 0 {
            return Err(Error::search("top_k must be at least 1"));
        }

        let request = SearchRequest {
            vector: query_embedding,
            limit: top_k,
            with_payload: true,
            with_vectors: false,
        };

        let response = self
            .client
            .post(&self.search_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::search(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::search(format!("Qdrant returned {}: {}", status, body)));
        }

        let search_response: SearchResponse = response.json().await.map_err(|e| {
            Error::search(format!("Failed to parse search response: {}", e.without_url()))
        })?;

        let hits: Vec<Hit> = search_response
            .result
            .into_iter()
            .map(ScoredPoint::into_hit)
            .collect();

        tracing::debug!(collection = %self.collection, hits = hits.len(), "Vector search done");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
