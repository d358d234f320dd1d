//! Typed repositories layered over any [`KeyValueStore`] as JSON values.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::{BTreeMap, BTreeSet};
use study_core::model::{
    AccessibilityPrefs, AssistantSettings, AssistantSettingsDraft, QuizAnswers, QuizScoreRecord,
    TopicId,
};

use crate::keys;
use crate::repository::{
    AssistantSettingsRepository, KeyValueStore, PreferencesRepository, ProgressRepository,
    QuizDraftRepository, StorageError,
};

async fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

async fn write_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
    store.put(key, &raw).await
}

#[async_trait]
impl<S> ProgressRepository for S
where
    S: KeyValueStore + ?Sized,
{
    async fn load_completed(&self) -> Result<BTreeSet<TopicId>, StorageError> {
        Ok(read_json(self, keys::COMPLETED_TOPICS)
            .await?
            .unwrap_or_default())
    }

    async fn save_completed(&self, ids: &BTreeSet<TopicId>) -> Result<(), StorageError> {
        write_json(self, keys::COMPLETED_TOPICS, ids).await
    }

    async fn load_bookmarks(&self) -> Result<BTreeSet<TopicId>, StorageError> {
        Ok(read_json(self, keys::BOOKMARKED_TOPICS)
            .await?
            .unwrap_or_default())
    }

    async fn save_bookmarks(&self, ids: &BTreeSet<TopicId>) -> Result<(), StorageError> {
        write_json(self, keys::BOOKMARKED_TOPICS, ids).await
    }

    async fn load_quiz_scores(
        &self,
    ) -> Result<BTreeMap<TopicId, QuizScoreRecord>, StorageError> {
        Ok(read_json(self, keys::QUIZ_SCORES).await?.unwrap_or_default())
    }

    async fn save_quiz_scores(
        &self,
        scores: &BTreeMap<TopicId, QuizScoreRecord>,
    ) -> Result<(), StorageError> {
        write_json(self, keys::QUIZ_SCORES, scores).await
    }
}

#[async_trait]
impl<S> QuizDraftRepository for S
where
    S: KeyValueStore + ?Sized,
{
    async fn load_draft(&self, quiz: &TopicId) -> Result<Option<QuizAnswers>, StorageError> {
        read_json(self, &keys::quiz_draft(quiz)).await
    }

    async fn save_draft(&self, quiz: &TopicId, answers: &QuizAnswers) -> Result<(), StorageError> {
        write_json(self, &keys::quiz_draft(quiz), answers).await
    }

    async fn delete_draft(&self, quiz: &TopicId) -> Result<(), StorageError> {
        self.delete(&keys::quiz_draft(quiz)).await
    }
}

#[async_trait]
impl<S> PreferencesRepository for S
where
    S: KeyValueStore + ?Sized,
{
    async fn load_accessibility(&self) -> Result<Option<AccessibilityPrefs>, StorageError> {
        read_json(self, keys::ACCESSIBILITY_PREFS).await
    }

    async fn save_accessibility(&self, prefs: &AccessibilityPrefs) -> Result<(), StorageError> {
        write_json(self, keys::ACCESSIBILITY_PREFS, prefs).await
    }
}

#[async_trait]
impl<S> AssistantSettingsRepository for S
where
    S: KeyValueStore + ?Sized,
{
    async fn get_settings(&self) -> Result<Option<AssistantSettings>, StorageError> {
        let draft: Option<AssistantSettingsDraft> =
            read_json(self, keys::ASSISTANT_SETTINGS).await?;
        draft
            .map(AssistantSettingsDraft::validate)
            .transpose()
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &AssistantSettings) -> Result<(), StorageError> {
        write_json(self, keys::ASSISTANT_SETTINGS, settings).await
    }
}
