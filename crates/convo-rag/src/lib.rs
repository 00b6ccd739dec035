//! convo-rag: conversation-aware retrieval-augmented generation
//!
//! Given a query and an optional conversation id, the orchestrator embeds the
//! query, retrieves grounding from a search index, assembles it with recent
//! dialogue into a chat request, and returns a cited answer while keeping a
//! bounded transcript per conversation.
//!
//! Embedding, search, generation, ingestion, and transcript persistence are
//! all trait objects, so backends can be swapped without touching the loop.

pub mod config;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod providers;
pub mod types;

pub use config::{RagConfig, UnknownConversationPolicy};
pub use conversation::{ConversationStore, InMemoryBackend, TranscriptBackend};
pub use error::{Error, ErrorKind, ProviderError, Result};
pub use orchestrator::{HealthReport, RagOrchestrator, RagOrchestratorBuilder};
pub use providers::{
    DocumentIngestion, EmbeddingProvider, GenerationProvider, SearchIndex, SearchResult,
};
pub use types::{ChatResult, ChatStage, Citation, Message, Role};
