//! Search index trait for hybrid (vector + keyword) retrieval

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Ranked document returned by a search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document id in the index
    pub id: String,
    /// Document title, if the index has one
    #[serde(default)]
    pub title: Option<String>,
    /// Document text used as grounding
    pub content: String,
    /// Relevance score (higher is more relevant)
    pub score: f32,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: content.into(),
            score,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Trait for hybrid similarity search
///
/// Results are returned in descending relevance; callers rely on that order
/// for citation numbering and never re-sort.
///
/// Implementations:
/// - `LocalSearchIndex`: in-memory cosine + keyword index
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Search with both the query embedding and the raw query text
    async fn query(
        &self,
        embedding: &[f32],
        text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, ProviderError>;

    /// Check if the index is healthy
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
