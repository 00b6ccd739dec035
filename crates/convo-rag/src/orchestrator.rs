//! Conversation-aware RAG orchestration
//!
//! One `chat` call walks `ResolveConversation -> Embed -> Search -> BuildContext
//! -> AssemblePrompt -> Generate -> Persist`. Any failure before `Persist`
//! leaves the conversation untouched; provider errors are returned, never
//! retried or swallowed here.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::RagConfig;
use crate::conversation::{ConversationStore, InMemoryBackend, TranscriptBackend};
use crate::error::{Error, ProviderError, Result};
use crate::generation::{referenced_indices, ContextBuilder, PromptBuilder};
use crate::providers::{
    DocumentIngestion, DocumentInfo, EmbeddingProvider, GenerationOptions, GenerationProvider,
    SearchIndex, UnimplementedIngestion,
};
use crate::types::{ChatResult, ChatStage, Message};

/// Coordinates providers and conversation state into the chat contract
pub struct RagOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SearchIndex>,
    generator: Arc<dyn GenerationProvider>,
    ingestion: Arc<dyn DocumentIngestion>,
    conversations: ConversationStore,
    config: RagConfig,
}

impl std::fmt::Debug for RagOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagOrchestrator {
    pub fn builder() -> RagOrchestratorBuilder {
        RagOrchestratorBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Answer `query` with grounding from the index and recent history of
    /// `conversation_id`, then record the exchange.
    pub async fn chat(&self, query: &str, conversation_id: Option<&str>) -> Result<ChatResult> {
        if query.trim().is_empty() {
            return Err(Error::invalid_input("query must not be empty"));
        }

        let start = Instant::now();
        let lease = self.conversations.resolve(conversation_id).await?;

        let span = tracing::info_span!(
            "chat",
            conversation_id = %lease.id(),
            new_conversation = lease.is_new(),
            history = lease.history().len(),
        );

        async move {
            tracing::debug!(stage = %ChatStage::Embed, "Embedding query");
            let embedding = self
                .embedder
                .embed(query)
                .await
                .map_err(|e| self.stage_failed(ChatStage::Embed, e))?;

            let top_k = self.config.retrieval.top_k;
            tracing::debug!(stage = %ChatStage::Search, top_k, "Searching index");
            let results = self
                .index
                .query(&embedding, query, top_k)
                .await
                .map_err(|e| self.stage_failed(ChatStage::Search, e))?;

            tracing::debug!(stage = %ChatStage::BuildContext, results = results.len(), "Building context");
            let grounding = ContextBuilder::build(&results);
            if grounding.is_empty() {
                tracing::info!("No search results, generating without grounding");
            }

            tracing::debug!(stage = %ChatStage::AssemblePrompt, "Assembling prompt");
            let messages = PromptBuilder::build_messages(
                &self.config.generation.system_prompt,
                lease.history(),
                self.config.conversation.history_window,
                &grounding.text,
                query,
            );

            tracing::debug!(
                stage = %ChatStage::Generate,
                provider = self.generator.name(),
                model = self.generator.model(),
                messages = messages.len(),
                "Generating answer"
            );
            let options = GenerationOptions {
                temperature: self.config.generation.temperature,
                max_tokens: self.config.generation.max_tokens,
            };
            let answer = self
                .generator
                .complete(&messages, options)
                .await
                .map_err(|e| self.stage_failed(ChatStage::Generate, e))?;

            tracing::debug!(stage = %ChatStage::Persist, "Recording exchange");
            let conversation_id = lease.id().to_string();
            let transcript_len = self
                .conversations
                .append(lease, Message::user(query), Message::assistant(answer.clone()))
                .await
                .inspect_err(|e| {
                    tracing::error!("Answer computed but not recorded: {}", e);
                })?;

            let referenced = referenced_indices(&answer, grounding.citations.len());

            tracing::info!(
                citations = grounding.citations.len(),
                referenced = referenced.len(),
                transcript_len,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Chat completed"
            );

            Ok(ChatResult {
                answer,
                citations: grounding.citations,
                referenced,
                conversation_id,
            })
        }
        .instrument(span)
        .await
    }

    fn stage_failed(&self, stage: ChatStage, source: ProviderError) -> Error {
        let err = match stage {
            ChatStage::Generate => Error::Generation(source),
            _ => Error::retrieval(stage, source),
        };
        tracing::warn!(stage = %stage, "Chat failed: {}", err);
        err
    }

    /// Pass a document through to the ingestion collaborator
    pub async fn upload_document(
        &self,
        filename: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<()> {
        if filename.trim().is_empty() {
            return Err(Error::invalid_input("filename must not be empty"));
        }

        self.ingestion
            .index(filename, content, content_type)
            .await
            .map_err(|e| {
                tracing::warn!(filename, provider = self.ingestion.name(), "Document upload failed: {}", e);
                Error::Ingestion(e)
            })
    }

    /// List documents known to the ingestion collaborator
    pub async fn list_documents(&self) -> Result<Vec<DocumentInfo>> {
        self.ingestion.list().await.map_err(Error::Ingestion)
    }

    /// Snapshot of a conversation transcript
    pub async fn transcript(&self, conversation_id: &str) -> Result<Option<Vec<Message>>> {
        self.conversations.transcript(conversation_id).await
    }

    /// Probe every provider concurrently
    pub async fn health(&self) -> HealthReport {
        let (embedder, index, generator, ingestion) = futures::join!(
            self.embedder.health_check(),
            self.index.health_check(),
            self.generator.health_check(),
            self.ingestion.health_check(),
        );

        let components = vec![
            ComponentHealth::from_check(self.embedder.name(), "embedding", embedder),
            ComponentHealth::from_check(self.index.name(), "search", index),
            ComponentHealth::from_check(self.generator.name(), "generation", generator),
            ComponentHealth::from_check(self.ingestion.name(), "ingestion", ingestion),
        ];
        let healthy = components.iter().all(|c| c.healthy);

        if !healthy {
            tracing::warn!("Health check failed: {:?}", components);
        }

        HealthReport {
            healthy,
            components,
            conversation_backend: self.conversations.backend_name().to_string(),
        }
    }

    /// Ready to serve chat calls
    pub async fn is_ready(&self) -> bool {
        self.health().await.healthy
    }
}

/// Status of a single provider
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub role: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn from_check(
        name: &str,
        role: &'static str,
        check: std::result::Result<bool, ProviderError>,
    ) -> Self {
        let (healthy, error) = match check {
            Ok(healthy) => (healthy, None),
            Err(e) => (false, Some(e.to_string())),
        };
        Self {
            name: name.to_string(),
            role,
            healthy,
            error,
        }
    }
}

/// Aggregate provider health
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
    pub conversation_backend: String,
}

/// Assembles a [`RagOrchestrator`]
#[derive(Default)]
pub struct RagOrchestratorBuilder {
    config: RagConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn SearchIndex>>,
    generator: Option<Arc<dyn GenerationProvider>>,
    ingestion: Option<Arc<dyn DocumentIngestion>>,
    backend: Option<Arc<dyn TranscriptBackend>>,
}

impl RagOrchestratorBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn GenerationProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Defaults to [`UnimplementedIngestion`]
    pub fn ingestion(mut self, ingestion: Arc<dyn DocumentIngestion>) -> Self {
        self.ingestion = Some(ingestion);
        self
    }

    /// Defaults to [`InMemoryBackend`]
    pub fn transcript_backend(mut self, backend: Arc<dyn TranscriptBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<RagOrchestrator> {
        self.config.validate()?;

        let embedder = self
            .embedder
            .ok_or_else(|| Error::config("an embedding provider is required"))?;
        let index = self
            .index
            .ok_or_else(|| Error::config("a search index is required"))?;
        let generator = self
            .generator
            .ok_or_else(|| Error::config("a generation provider is required"))?;
        let ingestion = self
            .ingestion
            .unwrap_or_else(|| Arc::new(UnimplementedIngestion));
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(InMemoryBackend::new()));

        tracing::info!(
            embedder = embedder.name(),
            index = index.name(),
            generator = generator.name(),
            ingestion = ingestion.name(),
            backend = backend.name(),
            top_k = self.config.retrieval.top_k,
            "RAG orchestrator initialized"
        );

        Ok(RagOrchestrator {
            conversations: ConversationStore::new(backend, &self.config.conversation),
            embedder,
            index,
            generator,
            ingestion,
            config: self.config,
        })
    }
}
