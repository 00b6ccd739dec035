//! Conversation store with per-conversation critical sections
//!
//! `resolve` hands out a [`ConversationLease`] that owns the conversation's
//! lock until it is consumed by `append` or dropped. Calls on the same id are
//! therefore serialized from history read to transcript write, while calls on
//! different ids never wait on each other.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::config::{ConversationConfig, UnknownConversationPolicy};
use crate::error::{Error, Result};
use crate::types::Message;

use super::backend::{InMemoryBackend, TranscriptBackend};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Exclusive access to one conversation between resolve and append
pub struct ConversationLease {
    id: String,
    history: Vec<Message>,
    is_new: bool,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl ConversationLease {
    /// Conversation id (generated when the caller supplied none)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Transcript as it was when the lease was taken
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// True when the conversation has never been persisted
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

impl Drop for ConversationLease {
    fn drop(&mut self) {
        // Release first so the strong count reflects only waiters
        drop(self.guard.take());
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl std::fmt::Debug for ConversationLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLease")
            .field("id", &self.id)
            .field("history_len", &self.history.len())
            .field("is_new", &self.is_new)
            .finish()
    }
}

/// Keyed transcript storage with FIFO truncation
pub struct ConversationStore {
    backend: Arc<dyn TranscriptBackend>,
    locks: Arc<LockMap>,
    max_transcript: usize,
    unknown_policy: UnknownConversationPolicy,
}

impl ConversationStore {
    /// Create a store over the given backend
    pub fn new(backend: Arc<dyn TranscriptBackend>, config: &ConversationConfig) -> Self {
        Self {
            backend,
            locks: Arc::new(DashMap::new()),
            max_transcript: config.max_transcript.max(1),
            unknown_policy: config.unknown_id_policy,
        }
    }

    /// Create a process-local store
    pub fn in_memory(config: &ConversationConfig) -> Self {
        Self::new(Arc::new(InMemoryBackend::new()), config)
    }

    pub fn max_transcript(&self) -> usize {
        self.max_transcript
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(id.to_string()).or_default().value())
    }

    /// Resolve a conversation and take its lock.
    ///
    /// Without an id a fresh one is generated and the history is empty; nothing
    /// is written until the first successful `append`. An id the backend does
    /// not know is handled per the configured [`UnknownConversationPolicy`].
    pub async fn resolve(&self, conversation_id: Option<&str>) -> Result<ConversationLease> {
        let (id, generated) = match conversation_id {
            Some(id) if id.trim().is_empty() => {
                return Err(Error::invalid_input("conversation id must not be blank"));
            }
            Some(id) => (id.to_string(), false),
            None => (Uuid::new_v4().to_string(), true),
        };

        let guard = self.lock_for(&id).lock_owned().await;
        let mut lease = ConversationLease {
            id,
            history: Vec::new(),
            is_new: true,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        };

        if generated {
            return Ok(lease);
        }

        let stored = self
            .backend
            .load(&lease.id)
            .await
            .map_err(|e| Error::store_unavailable(lease.id.clone(), e.to_string()))?;

        match stored {
            Some(history) => {
                lease.history = history;
                lease.is_new = false;
            }
            None if self.unknown_policy == UnknownConversationPolicy::Reject => {
                return Err(Error::ConversationNotFound(lease.id.clone()));
            }
            None => {
                tracing::debug!(conversation_id = %lease.id, "Unknown conversation id, starting empty");
            }
        }

        Ok(lease)
    }

    /// Append one exchange, keep the newest `max_transcript` messages, and
    /// release the lease. Returns the stored transcript length.
    pub async fn append(
        &self,
        mut lease: ConversationLease,
        user: Message,
        assistant: Message,
    ) -> Result<usize> {
        let mut transcript = std::mem::take(&mut lease.history);
        transcript.push(user);
        transcript.push(assistant);
        truncate_oldest(&mut transcript, self.max_transcript);

        let len = transcript.len();
        self.backend
            .save(&lease.id, transcript)
            .await
            .map_err(|e| Error::store_unavailable(lease.id.clone(), e.to_string()))?;

        Ok(len)
    }

    /// Snapshot of a stored transcript, waiting for any in-flight exchange on it
    pub async fn transcript(&self, conversation_id: &str) -> Result<Option<Vec<Message>>> {
        let guard = self.lock_for(conversation_id).lock_owned().await;
        let stored = self
            .backend
            .load(conversation_id)
            .await
            .map_err(|e| Error::store_unavailable(conversation_id, e.to_string()))?;
        drop(guard);
        self.locks
            .remove_if(conversation_id, |_, lock| Arc::strong_count(lock) == 1);
        Ok(stored)
    }
}

/// Drop oldest messages until at most `max` remain
fn truncate_oldest(transcript: &mut Vec<Message>, max: usize) {
    if transcript.len() > max {
        let excess = transcript.len() - max;
        transcript.drain(..excess);
    }
}
