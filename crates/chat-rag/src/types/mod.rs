//! Core types for the chat pipeline

pub mod query;
pub mod response;

pub use query::ChatRequest;
pub use response::{ChatResult, Hit};
