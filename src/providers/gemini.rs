//! Gemini-backed implementation of [`TextGenerator`].

use super::{GenerationError, TextGenerator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub struct GeminiGenerator {
    client: gemini::Client,
    model: String,
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.model)
            .field("client", &"<Gemini Client>")
            .finish()
    }
}

impl GeminiGenerator {
    /// Builds the client eagerly so a bad key configuration fails at
    /// startup rather than on the first lead message.
    pub fn new(api_key: &SecretString, model: impl Into<String>) -> Result<Self> {
        let client = gemini::Client::new(api_key.expose_secret())
            .map_err(|e| Error::Internal(format!("failed to create Gemini client: {e}")))?;

        Ok(Self {
            client,
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let agent = self.client.agent(&self.model).build();

        let completion = agent
            .prompt(prompt)
            .await
            .map_err(|e| GenerationError::Completion(e.to_string()))?;

        let text = completion.trim();
        if text.is_empty() {
            tracing::warn!(model = %self.model, "generator returned an empty completion");
            return Err(GenerationError::Empty);
        }

        Ok(text.to_string())
    }
}
