//! Error types for the chat pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chat pipeline errors
///
/// Provider variants carry the provider's own error text for logging. That
/// text never reaches the HTTP response body; see [`Error::public_message`].
#[derive(Debug, Error)]
pub enum Error {
    /// Bad, missing or empty client input
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Wrong HTTP method on a route
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Embedding provider failure
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector index failure
    #[error("Vector search failed: {0}")]
    Search(String),

    /// Generation provider failure
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Request deadline exceeded
    #[error("Request exceeded deadline of {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Pipeline stage that failed, if this is a pipeline failure
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Error::Embedding(_) => Some("embedding"),
            Error::Search(_) => Some("search"),
            Error::Generation(_) => Some("generation"),
            Error::Timeout(_) => Some("timeout"),
            _ => None,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Embedding(_)
            | Error::Search(_)
            | Error::Generation(_)
            | Error::Config(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short tag used as the `type` field of error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::MethodNotAllowed => "method_not_allowed",
            Error::Config(_) => "config",
            Error::Internal(_) => "internal",
            other => other.stage().unwrap_or("internal"),
        }
    }

    /// Message safe to return to clients.
    ///
    /// Validation messages are written by this crate and never contain the
    /// query; provider failures collapse to a fixed message per stage.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::MethodNotAllowed => "method must be POST".to_string(),
            Error::Embedding(_) => "failed to embed query".to_string(),
            Error::Search(_) => "vector search failed".to_string(),
            Error::Generation(_) => "answer generation failed".to_string(),
            Error::Timeout(limit) => format!("request timed out after {}s", limit.as_secs()),
            Error::Config(_) | Error::Internal(_) => "internal server error".to_string(),
        }
    }

    /// Server errors logged when turned into a response. Stage and timeout
    /// failures are logged by the pipeline, with timing, instead.
    fn logged_on_response(&self) -> bool {
        self.status().is_server_error() && self.stage().is_none()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.logged_on_response() {
            tracing::warn!(error_type = self.error_type(), "{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": self.error_type(),
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tags() {
        assert_eq!(Error::embedding("x").stage(), Some("embedding"));
        assert_eq!(Error::search("x").stage(), Some("search"));
        assert_eq!(Error::generation("x").stage(), Some("generation"));
        assert_eq!(Error::Timeout(Duration::from_secs(1)).stage(), Some("timeout"));
        assert_eq!(Error::validation("x").stage(), None);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Error::search("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::Timeout(Duration::from_secs(3)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_stage_failures_are_not_logged_twice() {
        assert!(!Error::embedding("x").logged_on_response());
        assert!(!Error::generation("x").logged_on_response());
        assert!(!Error::Timeout(Duration::from_secs(1)).logged_on_response());
        assert!(!Error::validation("x").logged_on_response());
        assert!(Error::Internal("x".to_string()).logged_on_response());
        assert!(Error::config("x").logged_on_response());
    }

    #[test]
    fn test_public_message_hides_provider_detail() {
        let err = Error::embedding("HTTP 500 from http://10.0.0.3:11434/api/embeddings: model missing");
        let message = err.public_message();
        assert!(!message.contains("10.0.0.3"));
        assert!(!message.contains("model missing"));
        assert_eq!(err.error_type(), "embedding");
    }
}
