//! The text-generation seam.
//!
//! Reply prose is produced by an external LLM. The flow only ever sees
//! `Result<String, GenerationError>` and chooses fallback wording itself,
//! so generation failures can never surface to a lead as an error.

pub mod gemini;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The completion request failed in transport or at the provider.
    #[error("completion failed: {0}")]
    Completion(String),

    /// The provider answered with nothing usable.
    #[error("empty completion")]
    Empty,
}

/// An opaque prompt-to-text function, no conversation state of its own.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
