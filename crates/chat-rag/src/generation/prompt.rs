//! Prompt templates for RAG generation

use std::fmt::Write;

use crate::types::Hit;

const PREAMBLE: &str =
    "You are a helpful assistant. Use the following context to answer the question.\n\n";

/// Prompt builder for grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the grounding prompt.
    ///
    /// Hits are rendered in the order given. With no hits the prompt still
    /// carries the preamble, question and answer cue.
    pub fn build(query: &str, hits: &[Hit]) -> String {
        let context_len: usize = hits.iter().map(|h| h.text.len() + h.source.len() + 32).sum();
        let mut prompt = String::with_capacity(PREAMBLE.len() + context_len + query.len() + 20);

        prompt.push_str(PREAMBLE);
        for (i, hit) in hits.iter().enumerate() {
            // Writing into a String cannot fail
            let _ = write!(
                prompt,
                "Context {} (source={}):\n{}\n\n",
                i + 1,
                hit.source,
                hit.text
            );
        }
        let _ = write!(prompt, "Question: {}\nAnswer:", query);

        prompt
    }
}
