use std::sync::Arc;

use storage::repository::PreferencesRepository;
use study_core::model::{AccessibilityAction, AccessibilityPrefs};

/// Current accessibility preferences, written through on every change.
#[derive(Clone)]
pub struct AccessibilityService {
    repo: Arc<dyn PreferencesRepository>,
    prefs: AccessibilityPrefs,
}

impl AccessibilityService {
    /// Load stored preferences. With nothing stored, `prefers_reduced_motion`
    /// (the host's motion hint) seeds `reduce_motion`.
    pub async fn load(repo: Arc<dyn PreferencesRepository>, prefers_reduced_motion: bool) -> Self {
        let prefs = match repo.load_accessibility().await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => AccessibilityPrefs {
                reduce_motion: prefers_reduced_motion,
                ..AccessibilityPrefs::default()
            },
            Err(err) => {
                log::warn!("ignoring stored accessibility preferences: {err}");
                AccessibilityPrefs::default()
            }
        };
        Self { repo, prefs }
    }

    #[must_use]
    pub fn prefs(&self) -> &AccessibilityPrefs {
        &self.prefs
    }

    /// Apply `action` and persist the result (best effort).
    pub async fn dispatch(&mut self, action: AccessibilityAction) -> AccessibilityPrefs {
        self.prefs = self.prefs.reduce(action);
        if let Err(err) = self.repo.save_accessibility(&self.prefs).await {
            log::warn!("failed to persist accessibility preferences: {err}");
        }
        self.prefs
    }
}
