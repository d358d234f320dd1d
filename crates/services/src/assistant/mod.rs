pub mod chat;
pub mod openai;

use async_trait::async_trait;

use crate::error::AssistantError;

pub use chat::{ChatMessage, ChatRole, ChatSession};
pub use openai::{AssistantConfig, OpenAiAssistant, TUTOR_INSTRUCTION};

/// Answers study questions, optionally grounded in the text being studied.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Ask `message` with `context` as background material.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError` when the assistant is unavailable or the
    /// request fails.
    async fn send_prompt(&self, context: Option<&str>, message: &str)
    -> Result<String, AssistantError>;

    fn enabled(&self) -> bool {
        true
    }
}
