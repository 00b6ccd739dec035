//! Generation request assembly

use crate::types::Message;

/// Prompt builder for grounded chat requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// Final user turn carrying grounding and question
    pub fn user_turn(context: &str, query: &str) -> String {
        format!("Context:\n{}\n\nQuestion: {}", context, query)
    }

    /// Build the message list sent to the generation provider:
    /// system instruction, then the last `history_window` transcript messages in
    /// their original order, then the grounded user turn.
    pub fn build_messages(
        system_prompt: &str,
        history: &[Message],
        history_window: usize,
        context: &str,
        query: &str,
    ) -> Vec<Message> {
        let start = history.len().saturating_sub(history_window);
        let recent = &history[start..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(recent.iter().cloned());
        messages.push(Message::user(Self::user_turn(context, query)));
        messages
    }
}
