use std::sync::Arc;
use std::time::Duration;

use storage::repository::QuizDraftRepository;
use study_core::model::{QuizAnswers, QuizAttempt, QuizError, QuizQuestion, QuizResult, TopicId};

use crate::Clock;
use crate::autosave::{AutoSaveStatus, AutoSaver, SaveError};

/// One running quiz with its answers auto-saved as a draft.
///
/// Answer changes are written after `delay` of quiet; the draft survives
/// submission and is deleted only by [`QuizSession::retry`].
pub struct QuizSession {
    id: TopicId,
    attempt: QuizAttempt,
    drafts: Arc<dyn QuizDraftRepository>,
    saver: AutoSaver<QuizAnswers>,
}

impl QuizSession {
    /// Start a quiz, resuming from the stored draft when one is readable.
    pub async fn start(
        id: TopicId,
        questions: Vec<QuizQuestion>,
        drafts: Arc<dyn QuizDraftRepository>,
        delay: Duration,
        clock: Clock,
    ) -> Self {
        let draft = match drafts.load_draft(&id).await {
            Ok(draft) => draft.unwrap_or_default(),
            Err(err) => {
                log::warn!("ignoring quiz draft for {id}: {err}");
                QuizAnswers::new()
            }
        };
        let attempt = QuizAttempt::resume(questions, draft);

        let repo = Arc::clone(&drafts);
        let key = id.clone();
        let mut saver = AutoSaver::new(delay, clock, move |answers: QuizAnswers| {
            let repo = Arc::clone(&repo);
            let key = key.clone();
            async move {
                repo.save_draft(&key, &answers)
                    .await
                    .map_err(|err| Box::new(err) as SaveError)
            }
        });
        saver.on_change(attempt.answers().clone());
        log::debug!("quiz {id} started with {} saved answers", attempt.answers().len());

        Self {
            id,
            attempt,
            drafts,
            saver,
        }
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn attempt(&self) -> &QuizAttempt {
        &self.attempt
    }

    #[must_use]
    pub fn save_status(&self) -> AutoSaveStatus {
        self.saver.status()
    }

    /// # Errors
    ///
    /// Returns `QuizError` when reviewing or for out-of-range indices.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), QuizError> {
        if self.attempt.select_answer(question, option)? {
            self.saver.on_change(self.attempt.answers().clone());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::Incomplete` until every question is answered.
    pub fn submit(&mut self) -> Result<QuizResult, QuizError> {
        self.attempt.submit()
    }

    /// Clear the answers and delete the stored draft.
    pub async fn retry(&mut self) {
        self.attempt.retry();
        self.saver.cancel().await;
        if let Err(err) = self.drafts.delete_draft(&self.id).await {
            log::warn!("failed to delete quiz draft for {}: {err}", self.id);
        }
    }

    /// Stop auto-saving; a pending save is dropped.
    pub fn close(&mut self) {
        self.saver.dispose();
    }

    /// Replace the debounce delay for later answer changes.
    pub fn set_autosave_delay(&mut self, delay: Duration) {
        self.saver.set_delay(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use storage::repository::{InMemoryStore, KeyValueStore, StorageError};
    use study_core::model::{QuizPhase, ScoreBand};
    use study_core::time::fixed_clock;

    const DELAY: Duration = Duration::from_millis(500);

    fn questions() -> Vec<QuizQuestion> {
        [1, 0, 2]
            .into_iter()
            .map(|correct| {
                QuizQuestion::new("?", vec!["a".into(), "b".into(), "c".into()], correct).unwrap()
            })
            .collect()
    }

    fn quiz_id() -> TopicId {
        TopicId::new("technical", "frequency-bands")
    }

    async fn start(store: &Arc<InMemoryStore>) -> QuizSession {
        QuizSession::start(quiz_id(), questions(), store.clone(), DELAY, fixed_clock()).await
    }

    async fn settle() {
        tokio::time::sleep(DELAY * 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn answers_are_drafted_and_resumed() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = start(&store).await;
        session.select_answer(0, 1).unwrap();
        session.select_answer(1, 2).unwrap();
        session.select_answer(1, 0).unwrap();
        settle().await;
        assert_eq!(
            store.raw("quiz-technical-frequency-bands").as_deref(),
            Some(r#"{"0":1,"1":0}"#)
        );
        session.close();

        let resumed = start(&store).await;
        assert_eq!(resumed.attempt().answers().get(1), Some(0));
        assert_eq!(resumed.attempt().answers().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn resuming_does_not_rewrite_the_draft() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put("quiz-technical-frequency-bands", r#"{"0":2}"#)
            .await
            .unwrap();
        let session = start(&store).await;
        assert_eq!(session.attempt().answers().get(0), Some(2));
        settle().await;
        assert_eq!(session.save_status().last_saved, None);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_draft_starts_empty() {
        let store = Arc::new(InMemoryStore::new());
        store
            .put("quiz-technical-frequency-bands", "{{{")
            .await
            .unwrap();
        let session = start(&store).await;
        assert!(session.attempt().answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_scores_and_retry_deletes_draft() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = start(&store).await;
        session.select_answer(0, 0).unwrap();
        session.select_answer(1, 0).unwrap();
        assert!(matches!(
            session.submit(),
            Err(QuizError::Incomplete { answered: 2, total: 3 })
        ));
        assert_eq!(session.attempt().phase(), QuizPhase::Answering);

        session.select_answer(2, 2).unwrap();
        let result = session.submit().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 67);
        assert_eq!(result.band, ScoreBand::Good);
        assert_eq!(
            session.select_answer(0, 1),
            Err(QuizError::AlreadySubmitted)
        );

        session.retry().await;
        assert!(session.attempt().answers().is_empty());
        assert_eq!(session.attempt().phase(), QuizPhase::Answering);
        settle().await;
        assert!(store.raw("quiz-technical-frequency-bands").is_none());

        session.close();
        let reloaded = start(&store).await;
        assert!(reloaded.attempt().answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn close_drops_unsaved_answers() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = start(&store).await;
        session.select_answer(0, 1).unwrap();
        session.close();
        settle().await;
        assert!(store.raw("quiz-technical-frequency-bands").is_none());
    }

    const DRAFT_KEY: &str = "quiz-technical-frequency-bands";

    /// Store whose first `slow_puts` writes take two seconds.
    struct SlowStore {
        inner: InMemoryStore,
        puts: AtomicUsize,
        slow_puts: usize,
    }

    impl SlowStore {
        fn new(slow_puts: usize) -> Self {
            Self {
                inner: InMemoryStore::new(),
                puts: AtomicUsize::new(0),
                slow_puts,
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.puts.fetch_add(1, Ordering::SeqCst) < self.slow_puts {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    async fn start_slow(store: &Arc<SlowStore>) -> QuizSession {
        QuizSession::start(quiz_id(), questions(), store.clone(), DELAY, fixed_clock()).await
    }

    #[tokio::test(start_paused = true)]
    async fn retry_outlasts_a_slow_draft_write() {
        let store = Arc::new(SlowStore::new(usize::MAX));
        let mut session = start_slow(&store).await;
        session.select_answer(0, 1).unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(session.save_status().is_saving);

        session.select_answer(1, 0).unwrap();
        session.retry().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.inner.raw(DRAFT_KEY).is_none());

        session.close();
        let resumed = start_slow(&store).await;
        assert!(resumed.attempt().answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn latest_answers_win_over_a_slow_earlier_write() {
        let store = Arc::new(SlowStore::new(1));
        let mut session = start_slow(&store).await;
        session.select_answer(0, 1).unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        session.select_answer(1, 0).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            store.inner.raw(DRAFT_KEY).as_deref(),
            Some(r#"{"0":1,"1":0}"#)
        );
        assert!(!session.save_status().is_saving);
    }
}
