//! Response types for chat calls

use serde::{Deserialize, Serialize};

/// Mapping from an `[index]` marker in the grounding block to its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based position in the grounding block
    pub index: usize,
    /// Id of the source document in the search index
    pub source_id: String,
    /// Display title (falls back to `Document <index>`)
    pub title: String,
    /// Relevance score reported by the index (higher is more relevant)
    pub relevance_score: f32,
}

impl Citation {
    /// Format citation for display in text
    pub fn format_inline(&self) -> String {
        format!("[{}] {} ({:.2})", self.index, self.title, self.relevance_score)
    }
}

/// Result of a successful chat call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    /// Generated answer
    pub answer: String,
    /// Citations in retrieval order, one per search result
    pub citations: Vec<Citation>,
    /// Citation indices the answer mentions as `[n]`, ascending
    #[serde(default)]
    pub referenced: Vec<usize>,
    /// Conversation the exchange was recorded under
    pub conversation_id: String,
}

impl ChatResult {
    /// Citations whose marker appears in the answer
    pub fn referenced_citations(&self) -> impl Iterator<Item = &Citation> {
        self.citations
            .iter()
            .filter(|c| self.referenced.contains(&c.index))
    }
}
