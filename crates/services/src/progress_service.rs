use std::sync::Arc;

use storage::repository::{ProgressRepository, StorageError};
use study_core::model::{Catalog, Progress, QuizResult, QuizScoreRecord, TopicId};

use crate::Clock;

/// Owns completion, bookmark and score state and writes every change through
/// to storage.
///
/// Writes are best effort: a failed write is logged and the in-memory state
/// stays authoritative for the session.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    progress: Progress,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            repo,
            progress: Progress::new(),
        }
    }

    /// Restore persisted state. Unreadable values load as empty.
    pub async fn load(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        let completed = or_empty("completed topics", repo.load_completed().await);
        let bookmarked = or_empty("bookmarked topics", repo.load_bookmarks().await);
        let scores = or_empty("quiz scores", repo.load_quiz_scores().await);
        log::info!(
            "loaded progress: {} completed, {} bookmarked, {} scores",
            completed.len(),
            bookmarked.len(),
            scores.len()
        );
        Self {
            clock,
            repo,
            progress: Progress::from_persisted(completed, bookmarked, scores),
        }
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn is_completed(&self, id: &TopicId) -> bool {
        self.progress.is_completed(id)
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &TopicId) -> bool {
        self.progress.is_bookmarked(id)
    }

    /// Add `id` to the completed set. Returns true if it was not there yet.
    pub async fn mark_completed(&mut self, id: TopicId) -> bool {
        let added = self.progress.mark_completed(id);
        if added {
            let result = self.repo.save_completed(self.progress.completed()).await;
            log_write_failure("completed topics", result);
        }
        added
    }

    /// Flip the bookmark on `id`. Returns the new membership.
    pub async fn toggle_bookmark(&mut self, id: TopicId) -> bool {
        let bookmarked = self.progress.toggle_bookmark(id);
        let result = self.repo.save_bookmarks(self.progress.bookmarked()).await;
        log_write_failure("bookmarked topics", result);
        bookmarked
    }

    /// Store the result of a submitted quiz, replacing any earlier score.
    pub async fn record_quiz_score(&mut self, id: TopicId, result: &QuizResult) -> QuizScoreRecord {
        let record = QuizScoreRecord {
            score: result.score,
            total: result.total,
            date: self.clock.now(),
        };
        self.progress.record_quiz_score(id, record.clone());
        let saved = self.repo.save_quiz_scores(self.progress.quiz_scores()).await;
        log_write_failure("quiz scores", saved);
        record
    }

    #[must_use]
    pub fn overall_progress(&self, catalog: &Catalog) -> u8 {
        self.progress.overall_progress(catalog)
    }

    #[must_use]
    pub fn module_progress(&self, catalog: &Catalog, module: &str) -> u8 {
        self.progress.module_progress(catalog, module)
    }
}

fn or_empty<T: Default>(what: &str, loaded: Result<T, StorageError>) -> T {
    loaded.unwrap_or_else(|err| {
        log::warn!("ignoring stored {what}: {err}");
        T::default()
    })
}

fn log_write_failure(what: &str, result: Result<(), StorageError>) {
    if let Err(err) = result {
        log::warn!("failed to persist {what}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use storage::repository::{InMemoryStore, KeyValueStore};
    use study_core::model::{Module, Topic, TopicKind};
    use study_core::time::{fixed_clock, fixed_now};

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    fn catalog() -> Catalog {
        let plain = |key: &str| Topic::new(key, key, "", TopicKind::Plain);
        Catalog::new(vec![
            Module::new("A", "A", vec![plain("t1"), plain("t2")]),
            Module::new("B", "B", vec![plain("t3")]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn completion_is_idempotent_and_persisted() {
        let store = Arc::new(InMemoryStore::new());
        let mut tracker = ProgressTracker::load(fixed_clock(), store.clone()).await;
        let id = TopicId::new("A", "t1");

        assert!(tracker.mark_completed(id.clone()).await);
        assert!(!tracker.mark_completed(id.clone()).await);
        assert_eq!(tracker.progress().completed().len(), 1);

        let reloaded = ProgressTracker::load(fixed_clock(), store).await;
        assert!(reloaded.is_completed(&id));
    }

    #[tokio::test]
    async fn bookmarks_toggle_and_reload() {
        let store = Arc::new(InMemoryStore::new());
        let mut tracker = ProgressTracker::load(fixed_clock(), store.clone()).await;
        let id = TopicId::new("B", "t3");

        assert!(tracker.toggle_bookmark(id.clone()).await);
        let reloaded = ProgressTracker::load(fixed_clock(), store.clone()).await;
        assert!(reloaded.is_bookmarked(&id));

        assert!(!tracker.toggle_bookmark(id.clone()).await);
        let reloaded = ProgressTracker::load(fixed_clock(), store).await;
        assert!(!reloaded.is_bookmarked(&id));
    }

    #[tokio::test]
    async fn overall_progress_grows_to_hundred() {
        let catalog = catalog();
        let store = Arc::new(InMemoryStore::new());
        let mut tracker = ProgressTracker::load(fixed_clock(), store).await;

        let mut last = tracker.overall_progress(&catalog);
        assert_eq!(last, 0);
        for id in catalog.topic_ids().collect::<Vec<_>>() {
            tracker.mark_completed(id).await;
            let now = tracker.overall_progress(&catalog);
            assert!(now >= last && now <= 100);
            last = now;
        }
        assert_eq!(last, 100);
        assert_eq!(tracker.module_progress(&catalog, "A"), 100);
    }

    #[tokio::test]
    async fn malformed_storage_loads_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.put("completedTopics", "not json").await.unwrap();
        store.put("quizScores", "[1,2]").await.unwrap();
        let tracker = ProgressTracker::load(fixed_clock(), store).await;
        assert!(tracker.progress().completed().is_empty());
        assert!(tracker.progress().quiz_scores().is_empty());
    }

    #[tokio::test]
    async fn write_failures_keep_in_memory_state() {
        let mut tracker = ProgressTracker::load(fixed_clock(), Arc::new(FailingStore)).await;
        let id = TopicId::new("A", "t2");
        assert!(tracker.mark_completed(id.clone()).await);
        assert!(tracker.toggle_bookmark(id.clone()).await);
        assert!(tracker.is_completed(&id));
        assert!(tracker.is_bookmarked(&id));
    }

    #[tokio::test]
    async fn quiz_score_overwrites_previous() {
        let store = Arc::new(InMemoryStore::new());
        let mut tracker = ProgressTracker::load(fixed_clock(), store.clone()).await;
        let id = TopicId::new("A", "t1");

        tracker.record_quiz_score(id.clone(), &QuizResult::new(1, 3)).await;
        let record = tracker
            .record_quiz_score(id.clone(), &QuizResult::new(3, 3))
            .await;
        assert_eq!(record.date, fixed_now());

        let reloaded = ProgressTracker::load(fixed_clock(), store).await;
        assert_eq!(reloaded.progress().quiz_score(&id), Some(&record));
    }
}
