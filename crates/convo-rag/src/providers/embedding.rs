//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::ProviderError;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
