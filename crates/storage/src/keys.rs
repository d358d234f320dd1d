//! Storage keys. Each feature owns exactly one key (drafts own one per quiz).

use study_core::model::TopicId;

pub const COMPLETED_TOPICS: &str = "completedTopics";
pub const BOOKMARKED_TOPICS: &str = "bookmarkedTopics";
pub const QUIZ_SCORES: &str = "quizScores";
pub const ACCESSIBILITY_PREFS: &str = "accessibility-prefs";
pub const ASSISTANT_SETTINGS: &str = "assistant-settings";

/// Key of the in-progress answers for one quiz, e.g. `quiz-technical-antennas`.
#[must_use]
pub fn quiz_draft(quiz: &TopicId) -> String {
    quiz.quiz_draft_key()
}
