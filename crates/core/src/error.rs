use thiserror::Error;

use crate::model::{AssistantSettingsError, CatalogError, QuizError, TopicIdError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    TopicId(#[from] TopicIdError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    AssistantSettings(#[from] AssistantSettingsError),
}
