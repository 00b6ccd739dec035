//! Document ingestion collaborator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Metadata about an indexed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub ingested_at: Option<DateTime<Utc>>,
}

/// Trait for adding documents to the search index
///
/// The orchestrator only passes calls through; chunking and indexing are the
/// collaborator's business.
#[async_trait]
pub trait DocumentIngestion: Send + Sync {
    /// Index a document
    async fn index(
        &self,
        filename: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ProviderError>;

    /// List indexed documents
    async fn list(&self) -> Result<Vec<DocumentInfo>, ProviderError>;

    /// Check if the collaborator is healthy
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Ingestion that accepts uploads without processing them and lists nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedIngestion;

#[async_trait]
impl DocumentIngestion for UnimplementedIngestion {
    async fn index(
        &self,
        filename: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ProviderError> {
        // TODO: chunk, embed and push into the search index once an ingestion backend exists
        tracing::info!(
            filename,
            content_type,
            bytes = content.len(),
            "Document accepted (ingestion not implemented)"
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DocumentInfo>, ProviderError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "unimplemented"
    }
}
