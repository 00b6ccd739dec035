//! Core types for the orchestrator

pub mod message;
pub mod response;
pub mod stage;

pub use message::{Message, Role};
pub use response::{ChatResult, Citation};
pub use stage::ChatStage;
