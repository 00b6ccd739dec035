//! Provider abstractions for embeddings, search, generation, and ingestion
//!
//! The orchestrator only talks to these traits, so backends can be swapped
//! without touching orchestration logic.

pub mod embedding;
pub mod ingestion;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod search_index;

pub use embedding::EmbeddingProvider;
pub use ingestion::{DocumentIngestion, DocumentInfo, UnimplementedIngestion};
pub use llm::{GenerationOptions, GenerationProvider};
pub use local::{IndexedDocument, LocalSearchIndex};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
pub use search_index::{SearchIndex, SearchResult};
