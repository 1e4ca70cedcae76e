//! chat-rag: retrieval-augmented chat over Ollama and Qdrant
//!
//! A `POST /chat` query is embedded, the nearest passages are fetched from
//! a vector index, and a generation model answers from a prompt grounded
//! in those passages. The answer is returned with the passages it used.

pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::ChatPipeline;
pub use types::{ChatRequest, ChatResult, Hit};
