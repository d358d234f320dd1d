use std::collections::{BTreeMap, BTreeSet};

use crate::model::catalog::Catalog;
use crate::model::ids::TopicId;
use crate::model::quiz::{QuizScoreRecord, percentage};

/// Completed topics, bookmarks and last quiz scores.
///
/// Ids are kept even when the catalog no longer has them, so a later
/// catalog revision that brings a topic back also brings back its state.
/// Percentages only ever count ids the catalog still contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    completed: BTreeSet<TopicId>,
    bookmarked: BTreeSet<TopicId>,
    quiz_scores: BTreeMap<TopicId, QuizScoreRecord>,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_persisted(
        completed: impl IntoIterator<Item = TopicId>,
        bookmarked: impl IntoIterator<Item = TopicId>,
        quiz_scores: BTreeMap<TopicId, QuizScoreRecord>,
    ) -> Self {
        Self {
            completed: completed.into_iter().collect(),
            bookmarked: bookmarked.into_iter().collect(),
            quiz_scores,
        }
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<TopicId> {
        &self.completed
    }

    #[must_use]
    pub fn bookmarked(&self) -> &BTreeSet<TopicId> {
        &self.bookmarked
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &BTreeMap<TopicId, QuizScoreRecord> {
        &self.quiz_scores
    }

    #[must_use]
    pub fn quiz_score(&self, id: &TopicId) -> Option<&QuizScoreRecord> {
        self.quiz_scores.get(id)
    }

    #[must_use]
    pub fn is_completed(&self, id: &TopicId) -> bool {
        self.completed.contains(id)
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &TopicId) -> bool {
        self.bookmarked.contains(id)
    }

    /// Returns true if the id was not already completed.
    pub fn mark_completed(&mut self, id: TopicId) -> bool {
        self.completed.insert(id)
    }

    /// Flip bookmark membership; returns whether the id is now bookmarked.
    pub fn toggle_bookmark(&mut self, id: TopicId) -> bool {
        if self.bookmarked.remove(&id) {
            false
        } else {
            self.bookmarked.insert(id);
            true
        }
    }

    /// Replaces any earlier score for the quiz.
    pub fn record_quiz_score(&mut self, id: TopicId, record: QuizScoreRecord) {
        self.quiz_scores.insert(id, record);
    }

    /// Completed share of every topic in the catalog, 0..=100.
    #[must_use]
    pub fn overall_progress(&self, catalog: &Catalog) -> u8 {
        let total = catalog.topic_count();
        let done = catalog
            .topic_ids()
            .filter(|id| self.completed.contains(id))
            .count();
        percentage(done, total)
    }

    /// Completed share of one module's topics; 0 for unknown or empty modules.
    #[must_use]
    pub fn module_progress(&self, catalog: &Catalog, module: &str) -> u8 {
        let Some(module) = catalog.module(module) else {
            return 0;
        };
        let total = module.topics().len();
        let done = module
            .topic_ids()
            .filter(|id| self.completed.contains(id))
            .count();
        percentage(done, total)
    }

    /// Number of completed topics of a module.
    #[must_use]
    pub fn module_completed_count(&self, catalog: &Catalog, module: &str) -> usize {
        catalog.module(module).map_or(0, |module| {
            module
                .topic_ids()
                .filter(|id| self.completed.contains(id))
                .count()
        })
    }
}
