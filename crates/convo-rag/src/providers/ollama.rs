//! Ollama-based providers for embeddings and chat completion
//!
//! Timeouts and retries are enforced here; the orchestrator never retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::OllamaConfig;
use crate::error::ProviderError;
use crate::types::Message;

use super::embedding::EmbeddingProvider;
use super::llm::{GenerationOptions, GenerationProvider};

/// Longest wait between retries
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Ollama API client with automatic retry
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
    timeout: Duration,
    backoff_base: Duration,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(config: &OllamaConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| ProviderError::request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            timeout,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Override the first retry delay (doubles per attempt)
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Delay before retry `attempt + 1`: doubles per attempt, capped at [`MAX_BACKOFF`]
    fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff_base.checked_mul(factor))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    fn map_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::from(err)
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                // A malformed body will not get better on retry
                Err(e @ ProviderError::Decode(_)) => return Err(e),
                Err(e) => {
                    if attempt < self.config.max_retries {
                        let delay = self.backoff_delay(attempt);
                        tracing::warn!(
                            "Ollama request failed (attempt {}/{}): {}; retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            e,
                            delay
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::unavailable("no attempt was made")))
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool, ProviderError> {
        match self.client.get(self.url("/api/tags")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = self.url("/api/embeddings");

        self.retry_request(|| {
            let url = url.clone();
            async move {
                let request = EmbedRequest {
                    model: &self.config.embed_model,
                    prompt: text,
                };

                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| self.map_error(e))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ProviderError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }

                let embed_response: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::decode(format!("embedding response: {}", e)))?;

                if embed_response.embedding.is_empty() {
                    return Err(ProviderError::decode("embedding response was empty"));
                }

                Ok(embed_response.embedding)
            }
        })
        .await
    }

    /// Run a non-streaming chat completion
    pub async fn chat(
        &self,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let url = self.url("/api/chat");

        tracing::debug!(
            model = %self.config.chat_model,
            messages = messages.len(),
            "Requesting chat completion"
        );

        self.retry_request(|| {
            let url = url.clone();
            async move {
                let request = ChatRequest {
                    model: &self.config.chat_model,
                    messages,
                    stream: false,
                    options: ChatOptions {
                        temperature: options.temperature,
                        num_predict: options.max_tokens,
                    },
                };

                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| self.map_error(e))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ProviderError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::decode(format!("chat response: {}", e)))?;

                Ok(chat_response.message.content)
            }
        })
        .await
    }
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> Result<Self, ProviderError> {
        Ok(Self::from_client(Arc::new(OllamaClient::new(config)?)))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.client.embed(text).await
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama chat provider for answer generation
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig) -> Result<Self, ProviderError> {
        Ok(Self::from_client(Arc::new(OllamaClient::new(config)?)))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn complete(
        &self,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.client.chat(messages, options).await
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.client.config().chat_model
    }
}
