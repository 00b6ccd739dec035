//! Conversation transcripts with bounded retention and per-id serialization

pub mod backend;
pub mod store;

pub use backend::{InMemoryBackend, TranscriptBackend};
pub use store::{ConversationLease, ConversationStore};
