//! In-memory hybrid search index
//!
//! Scores each document as `alpha * cosine + (1 - alpha) * keyword_overlap`,
//! the linear fusion strategy, and returns the best `top_k` in descending order.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, ProviderError, Result};
use crate::types::ChatStage;

use super::embedding::EmbeddingProvider;
use super::search_index::{SearchIndex, SearchResult};

/// Document held by the local index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    /// Precomputed embedding; embedded on load when absent
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// In-memory hybrid index
pub struct LocalSearchIndex {
    documents: RwLock<Vec<IndexedDocument>>,
    alpha: f32,
}

impl LocalSearchIndex {
    /// Create an empty index with the given vector weight (0.0..=1.0)
    pub fn new(alpha: f32) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Insert or replace a document by id
    pub fn insert(&self, document: IndexedDocument) {
        let mut documents = self.documents.write();
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Load a JSON array of documents, embedding any that lack a vector
    pub async fn load_json(
        &self,
        path: impl AsRef<Path>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let documents: Vec<IndexedDocument> = serde_json::from_str(&raw)?;
        let count = documents.len();

        for mut document in documents {
            if document.embedding.is_empty() {
                document.embedding = embedder
                    .embed(&document.content)
                    .await
                    .map_err(|e| Error::retrieval(ChatStage::Embed, e))?;
            }
            self.insert(document);
        }

        tracing::info!("Loaded {} documents into local index", count);
        Ok(count)
    }

    fn score(&self, document: &IndexedDocument, embedding: &[f32], terms: &HashSet<String>) -> f32 {
        let vector = cosine_similarity(embedding, &document.embedding);
        let keyword = keyword_overlap(terms, document);
        self.alpha * vector + (1.0 - self.alpha) * keyword
    }
}

impl Default for LocalSearchIndex {
    fn default() -> Self {
        Self::new(0.7)
    }
}

#[async_trait]
impl SearchIndex for LocalSearchIndex {
    async fn query(
        &self,
        embedding: &[f32],
        text: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<SearchResult>, ProviderError> {
        let terms = tokenize(text);
        let documents = self.documents.read();

        if let Some(doc) = documents
            .iter()
            .find(|d| !d.embedding.is_empty() && d.embedding.len() != embedding.len())
        {
            return Err(ProviderError::request(format!(
                "embedding dimension mismatch: query has {}, document '{}' has {}",
                embedding.len(),
                doc.id,
                doc.embedding.len()
            )));
        }

        let mut scored: Vec<SearchResult> = documents
            .iter()
            .map(|doc| SearchResult {
                id: doc.id.clone(),
                title: doc.title.clone(),
                content: doc.content.clone(),
                score: self.score(doc, embedding, &terms),
            })
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }

    fn name(&self) -> &str {
        "local"
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Fraction of query terms found in the document title or content
fn keyword_overlap(terms: &HashSet<String>, document: &IndexedDocument) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let mut words = tokenize(&document.content);
    if let Some(title) = &document.title {
        words.extend(tokenize(title));
    }

    let hits = terms.iter().filter(|t| words.contains(*t)).count();
    hits as f32 / terms.len() as f32
}
