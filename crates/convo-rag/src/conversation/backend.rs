//! Pluggable transcript persistence

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ProviderError;
use crate::types::Message;

/// Storage for whole transcripts keyed by conversation id
///
/// `save` replaces the stored transcript in a single call; a backend must never
/// leave a partially written transcript behind.
#[async_trait]
pub trait TranscriptBackend: Send + Sync {
    /// Load a transcript, `None` if the id was never saved
    async fn load(&self, conversation_id: &str) -> Result<Option<Vec<Message>>, ProviderError>;

    /// Replace the transcript for an id
    async fn save(&self, conversation_id: &str, transcript: Vec<Message>) -> Result<(), ProviderError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Process-local backend; transcripts live as long as the process
#[derive(Default)]
pub struct InMemoryBackend {
    transcripts: DashMap<String, Vec<Message>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

#[async_trait]
impl TranscriptBackend for InMemoryBackend {
    async fn load(&self, conversation_id: &str) -> Result<Option<Vec<Message>>, ProviderError> {
        Ok(self
            .transcripts
            .get(conversation_id)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, conversation_id: &str, transcript: Vec<Message>) -> Result<(), ProviderError> {
        self.transcripts.insert(conversation_id.to_string(), transcript);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
