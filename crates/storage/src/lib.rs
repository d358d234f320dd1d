#![forbid(unsafe_code)]

pub mod keys;
mod records;
pub mod repository;
pub mod sqlite;

pub use repository::{
    AssistantSettingsRepository, InMemoryStore, KeyValueStore, PreferencesRepository,
    ProgressRepository, QuizDraftRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
