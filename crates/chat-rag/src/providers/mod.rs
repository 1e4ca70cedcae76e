//! Provider abstractions for embeddings, vector search and generation
//!
//! The pipeline only talks to these traits, so stub providers can stand
//! in for the network services in tests.

pub mod embedding;
pub mod llm;
pub mod vector_store;
pub mod ollama;
pub mod qdrant;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::VectorStoreProvider;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
pub use qdrant::QdrantStore;
