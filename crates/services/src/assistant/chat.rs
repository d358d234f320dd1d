use std::sync::Arc;

use study_core::model::Topic;

use super::Assistant;

const EMPTY_REPLY: &str = "Sorry, I couldn't come up with an answer. Please try again.";
const FAILED_REPLY: &str = "Sorry, something went wrong reaching the study assistant. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A conversation with the study assistant about the open topic.
///
/// Failures never escape: they become apology messages in the transcript.
pub struct ChatSession {
    assistant: Arc<dyn Assistant>,
    topic_title: Option<String>,
    context: Option<String>,
    messages: Vec<ChatMessage>,
    loading: bool,
}

impl ChatSession {
    /// Open a chat, grounded in `topic` when one is being studied.
    #[must_use]
    pub fn open(assistant: Arc<dyn Assistant>, topic: Option<&Topic>) -> Self {
        let topic_title = topic.map(|topic| topic.title().to_string());
        let context = topic.map(|topic| {
            format!(
                "The student is reading \"{}\". Prefer this material when answering:\n\n{}",
                topic.title(),
                topic.content()
            )
        });
        let welcome = match &topic_title {
            Some(title) => format!(
                "Hello! I'm your AI study buddy. Ask me anything about \"{title}\" or other HAREC topics!"
            ),
            None => "Hello! I'm your AI study buddy. Ask me anything about the HAREC syllabus!".to_string(),
        };
        Self {
            assistant,
            topic_title,
            context,
            messages: vec![ChatMessage::model(welcome)],
            loading: false,
        }
    }

    #[must_use]
    pub fn topic_title(&self) -> Option<&str> {
        self.topic_title.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Send `message` and append the reply. Blank input is ignored and
    /// returns `None`.
    pub async fn send(&mut self, message: &str) -> Option<&ChatMessage> {
        let message = message.trim();
        if message.is_empty() || self.loading {
            return None;
        }
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: message.to_string(),
        });

        self.loading = true;
        let reply = match self
            .assistant
            .send_prompt(self.context.as_deref(), message)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_REPLY.to_string(),
            Err(err) => {
                log::warn!("study assistant failed: {err}");
                FAILED_REPLY.to_string()
            }
        };
        self.loading = false;

        self.messages.push(ChatMessage::model(reply));
        self.messages.last()
    }
}
