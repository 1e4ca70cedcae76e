//! Answer generation: Ollama client, response decoding and prompts

pub mod ollama;
pub mod prompt;
pub mod stream;

pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
pub use stream::{collect_answer, AnswerAccumulator, ResponseMode};
