//! Chat request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body of `POST /chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    pub query: String,

    /// Generation model override for this request (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            model: None,
        }
    }

    /// Override the generation model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Decode a raw request body.
    ///
    /// The body is decoded regardless of `Content-Type`. Decode errors are
    /// reported without echoing the body back.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::validation("request body is required"));
        }
        serde_json::from_slice(body).map_err(|e| {
            Error::validation(format!(
                "malformed JSON body (line {}, column {})",
                e.line(),
                e.column()
            ))
        })
    }

    /// Reject empty or whitespace-only queries
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::validation("query must not be empty"));
        }
        Ok(())
    }

    /// Model override, ignoring blank values
    pub fn model_override(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }
}
