use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use study_core::model::{AssistantSettings, DEFAULT_ASSISTANT_BASE_URL, DEFAULT_ASSISTANT_MODEL};

use super::Assistant;
use crate::error::AssistantError;

/// Built-in tutor persona used when no custom system prompt is configured.
pub const TUTOR_INSTRUCTION: &str = "You are EI-AI, a friendly and expert tutor for the Irish \
HAREC amateur radio exam. Explain concepts clearly, concisely and accurately, based on the study \
material provided. Politely decline questions unrelated to amateur radio.";

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

impl AssistantConfig {
    /// Read `STUDY_AI_API_KEY`, `STUDY_AI_BASE_URL` and `STUDY_AI_MODEL`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("STUDY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("STUDY_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_ASSISTANT_BASE_URL.into());
        let model = env::var("STUDY_AI_MODEL").unwrap_or_else(|_| DEFAULT_ASSISTANT_MODEL.into());
        Some(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            model,
            system_prompt: TUTOR_INSTRUCTION.into(),
        })
    }

    /// Config from persisted settings; `None` while no API key is stored.
    #[must_use]
    pub fn from_settings(settings: &AssistantSettings) -> Option<Self> {
        let api_key = settings.api_key()?;
        Some(Self {
            base_url: settings.base_url().to_string(),
            api_key: api_key.to_string(),
            model: settings.model().to_string(),
            system_prompt: settings
                .system_prompt()
                .unwrap_or(TUTOR_INSTRUCTION)
                .to_string(),
        })
    }

    fn system_message(&self, context: Option<&str>) -> String {
        match context.map(str::trim).filter(|ctx| !ctx.is_empty()) {
            Some(context) => format!("{}\n\n{context}", self.system_prompt),
            None => self.system_prompt.clone(),
        }
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiAssistant {
    client: Client,
    config: Option<AssistantConfig>,
}

impl OpenAiAssistant {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AssistantConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AssistantConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn request(config: &AssistantConfig, context: Option<&str>, message: &str) -> ChatRequest {
        ChatRequest {
            model: config.model.clone(),
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: config.system_message(context),
                },
                RequestMessage {
                    role: "user",
                    content: message.to_string(),
                },
            ],
            temperature: 0.2,
        }
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn send_prompt(
        &self,
        context: Option<&str>,
        message: &str,
    ) -> Result<String, AssistantError> {
        let config = self.config.as_ref().ok_or(AssistantError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = Self::request(config, context, message);

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AssistantError::EmptyResponse)?;

        Ok(content)
    }

    fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<RequestMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
