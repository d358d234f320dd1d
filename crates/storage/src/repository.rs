use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use study_core::model::{
    AccessibilityPrefs, AssistantSettings, QuizAnswers, QuizScoreRecord, TopicId,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string key/value backend.
///
/// Each feature owns its own key, so writers never share one.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Completed topics, bookmarks and quiz scores.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed data.
    async fn load_completed(&self) -> Result<BTreeSet<TopicId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn save_completed(&self, ids: &BTreeSet<TopicId>) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed data.
    async fn load_bookmarks(&self) -> Result<BTreeSet<TopicId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn save_bookmarks(&self, ids: &BTreeSet<TopicId>) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed data.
    async fn load_quiz_scores(&self)
    -> Result<BTreeMap<TopicId, QuizScoreRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the scores cannot be stored.
    async fn save_quiz_scores(
        &self,
        scores: &BTreeMap<TopicId, QuizScoreRecord>,
    ) -> Result<(), StorageError>;
}

/// In-progress quiz answers, one draft per quiz.
#[async_trait]
pub trait QuizDraftRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed drafts.
    async fn load_draft(&self, quiz: &TopicId) -> Result<Option<QuizAnswers>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be stored.
    async fn save_draft(&self, quiz: &TopicId, answers: &QuizAnswers) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be removed.
    async fn delete_draft(&self, quiz: &TopicId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed preferences.
    async fn load_accessibility(&self) -> Result<Option<AccessibilityPrefs>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the preferences cannot be stored.
    async fn save_accessibility(&self, prefs: &AccessibilityPrefs) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AssistantSettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed or invalid settings.
    async fn get_settings(&self) -> Result<Option<AssistantSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &AssistantSettings) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key`, bypassing the async interface.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub quiz_drafts: Arc<dyn QuizDraftRepository>,
    pub preferences: Arc<dyn PreferencesRepository>,
    pub assistant_settings: Arc<dyn AssistantSettingsRepository>,
}

impl Storage {
    /// Expose every repository over one key/value backend.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let progress: Arc<dyn ProgressRepository> = store.clone();
        let quiz_drafts: Arc<dyn QuizDraftRepository> = store.clone();
        let preferences: Arc<dyn PreferencesRepository> = store.clone();
        let assistant_settings: Arc<dyn AssistantSettingsRepository> = store;
        Self {
            progress,
            quiz_drafts,
            preferences,
            assistant_settings,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
