use std::sync::Arc;

use storage::repository::AssistantSettingsRepository;
use study_core::model::{AssistantSettings, AssistantSettingsDraft};

use crate::error::AssistantSettingsServiceError;

#[derive(Clone)]
pub struct AssistantSettingsService {
    repo: Arc<dyn AssistantSettingsRepository>,
}

impl AssistantSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn AssistantSettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `AssistantSettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<AssistantSettings, AssistantSettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `AssistantSettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: AssistantSettingsDraft,
    ) -> Result<AssistantSettings, AssistantSettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn missing_settings_load_as_disabled_defaults() {
        let service = AssistantSettingsService::new(Arc::new(InMemoryStore::new()));
        let settings = service.load().await.unwrap();
        assert!(!settings.is_enabled());
        assert_eq!(settings.model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn save_rejects_bad_url_and_keeps_previous() {
        let service = AssistantSettingsService::new(Arc::new(InMemoryStore::new()));
        service
            .save(AssistantSettingsDraft {
                api_key: Some("  sk-live ".into()),
                ..AssistantSettingsDraft::default()
            })
            .await
            .unwrap();

        let err = service
            .save(AssistantSettingsDraft {
                base_url: Some("::nope".into()),
                ..AssistantSettingsDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantSettingsServiceError::Settings(_)));

        let loaded = service.load().await.unwrap();
        assert_eq!(loaded.api_key(), Some("sk-live"));
    }
}
