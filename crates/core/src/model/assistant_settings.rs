use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default endpoint of the study assistant (OpenAI-compatible API).
pub const DEFAULT_ASSISTANT_BASE_URL: &str = "https://api.openai.com/v1";
/// Model used when none is configured.
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the optional AI study assistant.
///
/// The assistant is disabled while no API key is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSettings {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    system_prompt: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantSettingsDraft {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssistantSettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl AssistantSettingsDraft {
    /// Trim blanks away and check the base URL.
    ///
    /// # Errors
    ///
    /// Returns `AssistantSettingsError::InvalidBaseUrl` if a base URL is
    /// present but does not parse.
    pub fn validate(self) -> Result<AssistantSettings, AssistantSettingsError> {
        let base_url = normalize_optional(self.base_url);
        if let Some(url) = base_url.as_deref() {
            Url::parse(url).map_err(|_| AssistantSettingsError::InvalidBaseUrl(url.to_string()))?;
        }

        Ok(AssistantSettings {
            api_key: normalize_optional(self.api_key),
            model: normalize_optional(self.model),
            base_url,
            system_prompt: normalize_optional(self.system_prompt),
        })
    }
}

impl AssistantSettings {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_ASSISTANT_MODEL)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_BASE_URL)
    }

    /// Custom tutor instruction, replacing the built-in one when set.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_become_defaults() {
        let settings = AssistantSettingsDraft {
            api_key: Some("   ".into()),
            model: Some(String::new()),
            ..AssistantSettingsDraft::default()
        }
        .validate()
        .unwrap();
        assert!(!settings.is_enabled());
        assert_eq!(settings.model(), DEFAULT_ASSISTANT_MODEL);
        assert_eq!(settings.base_url(), DEFAULT_ASSISTANT_BASE_URL);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = AssistantSettingsDraft {
            base_url: Some("not a url".into()),
            ..AssistantSettingsDraft::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AssistantSettingsError::InvalidBaseUrl(_)));
    }

    #[test]
    fn keeps_trimmed_key() {
        let settings = AssistantSettingsDraft {
            api_key: Some(" sk-test ".into()),
            base_url: Some("http://localhost:8080/v1".into()),
            ..AssistantSettingsDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(settings.api_key(), Some("sk-test"));
        assert_eq!(settings.base_url(), "http://localhost:8080/v1");
    }
}
