//! Response types

use serde::{Deserialize, Serialize};

/// One retrieved passage from vector search.
///
/// `score` is passed through exactly as the index reported it; whether
/// higher or lower is better depends on the collection's metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Point id as reported by the index (numeric ids are stringified)
    pub id: String,
    /// Similarity score
    pub score: f64,
    /// Passage text (empty when the payload has none)
    pub text: String,
    /// Source label (empty when the payload has none)
    pub source: String,
}

impl Hit {
    /// Create a hit
    pub fn new(
        id: impl Into<String>,
        score: f64,
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            score,
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Body of a successful `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Generated answer
    pub answer: String,
    /// Passages used for grounding, in retrieval order
    pub sources: Vec<Hit>,
}
