//! Stages of a single chat invocation

use serde::Serialize;
use std::fmt;

/// Per-invocation state machine:
/// `ResolveConversation -> Embed -> Search -> BuildContext -> AssemblePrompt -> Generate -> Persist`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStage {
    ResolveConversation,
    Embed,
    Search,
    BuildContext,
    AssemblePrompt,
    Generate,
    Persist,
}

impl ChatStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStage::ResolveConversation => "resolve_conversation",
            ChatStage::Embed => "embed",
            ChatStage::Search => "search",
            ChatStage::BuildContext => "build_context",
            ChatStage::AssemblePrompt => "assemble_prompt",
            ChatStage::Generate => "generate",
            ChatStage::Persist => "persist",
        }
    }
}

impl fmt::Display for ChatStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
