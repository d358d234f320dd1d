use std::sync::Arc;
use std::time::Duration;

use storage::repository::Storage;
use study_core::model::{AccessibilityAction, AccessibilityPrefs, Catalog};

use crate::Clock;
use crate::accessibility_service::AccessibilityService;
use crate::assistant::{Assistant, AssistantConfig, ChatSession, OpenAiAssistant};
use crate::assistant_settings_service::AssistantSettingsService;
use crate::error::StudyServicesError;
use crate::progress_service::ProgressTracker;
use crate::study_service::StudyService;

/// Startup options that are not stored with the study state.
#[derive(Clone, Debug, Default)]
pub struct StudyOptions {
    /// Overrides the stored auto-save frequency for quiz drafts.
    pub autosave_delay: Option<Duration>,
    /// Host hint used when no accessibility preferences are stored yet.
    pub prefers_reduced_motion: bool,
}

/// Assembles app-facing services over one storage backend.
pub struct StudyServices {
    study: StudyService,
    accessibility: AccessibilityService,
    autosave_override: Option<Duration>,
    assistant_settings: Arc<AssistantSettingsService>,
    assistant: Arc<dyn Assistant>,
}

impl StudyServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `StudyServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
        options: StudyOptions,
    ) -> Result<Self, StudyServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, catalog, options).await)
    }

    /// Build services over an existing storage. The assistant comes from
    /// stored settings, else from the environment.
    pub async fn with_storage(
        storage: Storage,
        clock: Clock,
        catalog: Catalog,
        options: StudyOptions,
    ) -> Self {
        let assistant_settings = Arc::new(AssistantSettingsService::new(Arc::clone(
            &storage.assistant_settings,
        )));
        let config = match assistant_settings.load().await {
            Ok(settings) => AssistantConfig::from_settings(&settings),
            Err(err) => {
                log::warn!("ignoring stored assistant settings: {err}");
                None
            }
        }
        .or_else(AssistantConfig::from_env);
        let assistant: Arc<dyn Assistant> = Arc::new(OpenAiAssistant::new(config));

        Self::assemble(storage, clock, catalog, options, assistant_settings, assistant).await
    }

    /// Same as [`StudyServices::with_storage`] with an explicit assistant.
    pub async fn with_assistant(
        storage: Storage,
        clock: Clock,
        catalog: Catalog,
        options: StudyOptions,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        let assistant_settings = Arc::new(AssistantSettingsService::new(Arc::clone(
            &storage.assistant_settings,
        )));
        Self::assemble(storage, clock, catalog, options, assistant_settings, assistant).await
    }

    async fn assemble(
        storage: Storage,
        clock: Clock,
        catalog: Catalog,
        options: StudyOptions,
        assistant_settings: Arc<AssistantSettingsService>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        let accessibility = AccessibilityService::load(
            Arc::clone(&storage.preferences),
            options.prefers_reduced_motion,
        )
        .await;
        let autosave_delay = options
            .autosave_delay
            .unwrap_or_else(|| accessibility.prefs().auto_save_delay());
        let tracker = ProgressTracker::load(clock, Arc::clone(&storage.progress)).await;
        let study = StudyService::new(
            Arc::new(catalog),
            clock,
            tracker,
            Arc::clone(&storage.quiz_drafts),
            autosave_delay,
        );

        Self {
            study,
            accessibility,
            autosave_override: options.autosave_delay,
            assistant_settings,
            assistant,
        }
    }

    #[must_use]
    pub fn study(&self) -> &StudyService {
        &self.study
    }

    pub fn study_mut(&mut self) -> &mut StudyService {
        &mut self.study
    }

    #[must_use]
    pub fn accessibility(&self) -> &AccessibilityService {
        &self.accessibility
    }

    /// Apply a preference change; a new auto-save frequency reaches the
    /// quiz drafts unless the delay was fixed at startup.
    pub async fn update_accessibility(&mut self, action: AccessibilityAction) -> AccessibilityPrefs {
        let prefs = self.accessibility.dispatch(action).await;
        if self.autosave_override.is_none() {
            self.study.set_autosave_delay(prefs.auto_save_delay());
        }
        prefs
    }

    #[must_use]
    pub fn assistant_settings(&self) -> Arc<AssistantSettingsService> {
        Arc::clone(&self.assistant_settings)
    }

    #[must_use]
    pub fn assistant_enabled(&self) -> bool {
        self.assistant.enabled()
    }

    /// Open a chat about the topic currently on screen, if any.
    #[must_use]
    pub fn open_chat(&self) -> ChatSession {
        let catalog = self.study.catalog();
        let topic = self
            .study
            .view()
            .topic_id()
            .and_then(|id| catalog.resolve(id));
        ChatSession::open(Arc::clone(&self.assistant), topic)
    }
}
