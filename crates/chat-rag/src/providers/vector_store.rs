//! Vector store provider trait for similarity search

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Hit;

/// Trait for nearest-neighbour search over stored passages
///
/// Implementations:
/// - `QdrantStore`: Qdrant REST API
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Return up to `top_k` hits for `query_embedding`, in the order the
    /// index ranked them.
    ///
    /// An empty result is `Ok(vec![])`; failures are `Error::Search`.
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<Hit>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
