//! Grounding context, prompt assembly, and citation handling

pub mod citation;
pub mod context;
pub mod prompt;

pub use citation::referenced_indices;
pub use context::{ContextBuilder, GroundingContext};
pub use prompt::PromptBuilder;
