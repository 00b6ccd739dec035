//! Configuration for the orchestrator and its provider adapters

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Grounding and citation policy sent as the system message
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the provided context.
Always cite your sources using [1], [2], etc. when referencing information from the context.
If you cannot find the answer in the context, say so clearly.
Be concise and accurate.";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Conversation history configuration
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Generation parameters
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Ollama adapter configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of search results requested per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Weight of vector similarity versus keyword overlap in the local index
    #[serde(default = "default_hybrid_alpha")]
    pub hybrid_alpha: f32,
}

fn default_top_k() -> usize { 5 }
fn default_hybrid_alpha() -> f32 { 0.7 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            hybrid_alpha: 0.7,
        }
    }
}

/// What to do with a conversation id the store has never seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownConversationPolicy {
    /// Treat it as a new, empty conversation under the supplied id
    #[default]
    Create,
    /// Fail with `ConversationNotFound`
    Reject,
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Messages retained per conversation (oldest dropped first)
    #[serde(default = "default_max_transcript")]
    pub max_transcript: usize,
    /// Most recent messages replayed into each generation request
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Handling of unrecognized conversation ids
    #[serde(default)]
    pub unknown_id_policy: UnknownConversationPolicy,
}

fn default_max_transcript() -> usize { 10 }
fn default_history_window() -> usize { 4 }

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_transcript: 10,
            history_window: 4,
            unknown_id_policy: UnknownConversationPolicy::Create,
        }
    }
}

/// Generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in the completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// System instruction prepended to every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1000 }
fn default_system_prompt() -> String { DEFAULT_SYSTEM_PROMPT.to_string() }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Embedding model name
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String { "http://localhost:11434".to_string() }
fn default_embed_model() -> String { "nomic-embed-text".to_string() }
fn default_chat_model() -> String { "llama3.2:3b".to_string() }
fn default_timeout_secs() -> u64 { 120 }
fn default_max_retries() -> u32 { 2 }

/// Upper bound accepted for `ollama.max_retries`
pub const MAX_OLLAMA_RETRIES: u32 = 10;

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            chat_model: default_chat_model(),
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file; missing sections take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: RagConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONVO_RAG_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("{} has invalid value '{}'", key, value)))
        }

        if let Some(v) = lookup("CONVO_RAG_TOP_K") {
            self.retrieval.top_k = parse("CONVO_RAG_TOP_K", &v)?;
        }
        if let Some(v) = lookup("CONVO_RAG_MAX_TRANSCRIPT") {
            self.conversation.max_transcript = parse("CONVO_RAG_MAX_TRANSCRIPT", &v)?;
        }
        if let Some(v) = lookup("CONVO_RAG_HISTORY_WINDOW") {
            self.conversation.history_window = parse("CONVO_RAG_HISTORY_WINDOW", &v)?;
        }
        if let Some(v) = lookup("CONVO_RAG_UNKNOWN_ID_POLICY") {
            self.conversation.unknown_id_policy = match v.trim().to_lowercase().as_str() {
                "create" => UnknownConversationPolicy::Create,
                "reject" => UnknownConversationPolicy::Reject,
                other => {
                    return Err(Error::config(format!(
                        "CONVO_RAG_UNKNOWN_ID_POLICY must be 'create' or 'reject', got '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(v) = lookup("CONVO_RAG_TEMPERATURE") {
            self.generation.temperature = parse("CONVO_RAG_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("CONVO_RAG_OLLAMA_URL") {
            self.ollama.base_url = v;
        }
        if let Some(v) = lookup("CONVO_RAG_EMBED_MODEL") {
            self.ollama.embed_model = v;
        }
        if let Some(v) = lookup("CONVO_RAG_CHAT_MODEL") {
            self.ollama.chat_model = v;
        }

        self.validate()
    }

    /// Check invariants between settings
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.retrieval.hybrid_alpha) {
            return Err(Error::config("retrieval.hybrid_alpha must be within 0.0..=1.0"));
        }
        if self.conversation.max_transcript == 0 {
            return Err(Error::config("conversation.max_transcript must be at least 1"));
        }
        if self.conversation.history_window > self.conversation.max_transcript {
            return Err(Error::config(format!(
                "conversation.history_window ({}) cannot exceed conversation.max_transcript ({})",
                self.conversation.history_window, self.conversation.max_transcript
            )));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::config("generation.temperature must be within 0.0..=2.0"));
        }
        if self.ollama.base_url.trim().is_empty() {
            return Err(Error::config("ollama.base_url is empty"));
        }
        if self.ollama.max_retries > MAX_OLLAMA_RETRIES {
            return Err(Error::config(format!(
                "ollama.max_retries ({}) cannot exceed {}",
                self.ollama.max_retries, MAX_OLLAMA_RETRIES
            )));
        }
        Ok(())
    }
}
