//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::{AssistantSettingsError, CatalogError, QuizError, TopicId};

/// Errors emitted by an [`Assistant`](crate::assistant::Assistant).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    #[error("study assistant is not configured")]
    Disabled,
    #[error("study assistant returned an empty response")]
    EmptyResponse,
    #[error("study assistant request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by quiz operations of `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("no quiz is active")]
    NoActiveQuiz,
    #[error("topic {id} has no quiz")]
    NoQuiz { id: TopicId },
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted by `AssistantSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantSettingsServiceError {
    #[error(transparent)]
    Settings(#[from] AssistantSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while assembling `StudyServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyServicesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
