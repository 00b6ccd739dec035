//! Error types for the RAG orchestrator

use std::time::Duration;

use thiserror::Error;

use crate::types::ChatStage;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by an external collaborator (embedder, index, generator, ingestion)
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request could not be sent or the connection failed
    #[error("request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider did not answer within its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// Provider is not reachable or refused the call
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Operation is not provided by this collaborator
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl ProviderError {
    /// Create a request error
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured deadline on the error
            ProviderError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    RetrievalError,
    GenerationError,
    StoreUnavailable,
    NotFound,
    Ingestion,
    Config,
    Internal,
}

/// Orchestrator errors
#[derive(Debug, Error)]
pub enum Error {
    /// Caller error, rejected before any provider call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding or search failed
    #[error("Retrieval failed during {stage}: {source}")]
    Retrieval {
        stage: ChatStage,
        #[source]
        source: ProviderError,
    },

    /// Completion failed
    #[error("Generation failed: {0}")]
    Generation(#[source] ProviderError),

    /// Transcript could not be read or written; an answer may have been computed
    /// but was not recorded
    #[error("Conversation store unavailable for {conversation_id}: {message}")]
    StoreUnavailable {
        conversation_id: String,
        message: String,
    },

    /// Conversation id is unknown and the store is configured to reject it
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Ingestion collaborator failure
    #[error("Ingestion failed: {0}")]
    Ingestion(#[source] ProviderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a retrieval error for the given stage
    pub fn retrieval(stage: ChatStage, source: ProviderError) -> Self {
        Self::Retrieval { stage, source }
    }

    /// Create a store error
    pub fn store_unavailable(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            conversation_id: conversation_id.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Retrieval { .. } => ErrorKind::RetrievalError,
            Error::Generation(_) => ErrorKind::GenerationError,
            Error::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Error::ConversationNotFound(_) => ErrorKind::NotFound,
            Error::Ingestion(_) => ErrorKind::Ingestion,
            Error::Config(_) | Error::Toml(_) => ErrorKind::Config,
            Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }

    /// Nothing was mutated; the same call may be issued again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RetrievalError | ErrorKind::GenerationError
        )
    }

    /// The outcome is unknown to the caller (answer computed, not recorded)
    pub fn is_indeterminate(&self) -> bool {
        matches!(self.kind(), ErrorKind::StoreUnavailable)
    }

    /// Stage the failure happened in, when it maps to one
    pub fn stage(&self) -> Option<ChatStage> {
        match self {
            Error::InvalidInput(_) | Error::ConversationNotFound(_) => {
                Some(ChatStage::ResolveConversation)
            }
            Error::Retrieval { stage, .. } => Some(*stage),
            Error::Generation(_) => Some(ChatStage::Generate),
            Error::StoreUnavailable { .. } => Some(ChatStage::Persist),
            _ => None,
        }
    }
}
