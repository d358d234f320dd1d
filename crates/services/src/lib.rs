#![forbid(unsafe_code)]

pub mod accessibility_service;
pub mod app_services;
pub mod assistant;
pub mod assistant_settings_service;
pub mod autosave;
pub mod error;
pub mod progress_service;
pub mod quiz_session;
pub mod study_service;

pub use study_core::Clock;

pub use accessibility_service::AccessibilityService;
pub use app_services::{StudyOptions, StudyServices};
pub use assistant::{Assistant, ChatMessage, ChatRole, ChatSession, OpenAiAssistant};
pub use assistant_settings_service::AssistantSettingsService;
pub use autosave::{AutoSaveStatus, AutoSaver};
pub use error::{AssistantError, AssistantSettingsServiceError, QuizSessionError, StudyServicesError};
pub use progress_service::ProgressTracker;
pub use quiz_session::QuizSession;
pub use study_service::StudyService;
