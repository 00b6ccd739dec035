//! Generation provider trait for chat completions

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::Message;

/// Sampling parameters passed with each completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Trait for chat-style answer generation
///
/// Implementations:
/// - `OllamaGenerator`: Local Ollama server (`/api/chat`)
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Complete an ordered list of role-tagged messages
    async fn complete(
        &self,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, ProviderError>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str {
        "unknown"
    }
}
