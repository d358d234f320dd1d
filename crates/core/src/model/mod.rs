mod accessibility;
mod assistant_settings;
mod catalog;
mod guide;
mod ids;
mod progress;
mod quiz;

pub use accessibility::{
    AccessibilityAction, AccessibilityPatch, AccessibilityPrefs, DEFAULT_AUTO_SAVE_FREQUENCY_MS,
    FontSize, LetterSpacing, LineHeight, ReadingSettings, ReadingSettingsPatch, Theme,
};
pub use assistant_settings::{
    AssistantSettings, AssistantSettingsDraft, AssistantSettingsError, DEFAULT_ASSISTANT_BASE_URL,
    DEFAULT_ASSISTANT_MODEL,
};
pub use catalog::{
    AllocationStatus, Catalog, CatalogError, ExtendedData, FrequencyBand, FrequencyTable,
    GuideKind, Module, QuizQuestion, Topic, TopicKind,
};
pub use guide::{
    AccountCreation, GeneralProcess, LicenceFee, LicenceStep, LicenceType, LicensingGuide,
    PageCursor, SystemInfo,
};
pub use ids::{TOPIC_ID_SEPARATOR, TopicId, TopicIdError};
pub use progress::Progress;
pub use quiz::{
    OptionMark, QuizAnswers, QuizAttempt, QuizError, QuizPhase, QuizResult, QuizScoreRecord,
    ScoreBand, percentage,
};
