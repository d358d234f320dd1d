use std::sync::Arc;
use std::time::Duration;

use storage::repository::QuizDraftRepository;
use study_core::model::{Catalog, QuizResult, QuizScoreRecord, TopicId};
use study_core::{Navigator, View};

use crate::Clock;
use crate::error::QuizSessionError;
use crate::progress_service::ProgressTracker;
use crate::quiz_session::QuizSession;

/// Drives navigation over the catalog together with progress and the active quiz.
///
/// Leaving the quiz view by any route closes the quiz session, dropping a
/// draft save that has not fired yet.
pub struct StudyService {
    catalog: Arc<Catalog>,
    clock: Clock,
    navigator: Navigator,
    tracker: ProgressTracker,
    drafts: Arc<dyn QuizDraftRepository>,
    autosave_delay: Duration,
    quiz: Option<QuizSession>,
}

impl StudyService {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        clock: Clock,
        tracker: ProgressTracker,
        drafts: Arc<dyn QuizDraftRepository>,
        autosave_delay: Duration,
    ) -> Self {
        Self {
            catalog,
            clock,
            navigator: Navigator::new(),
            tracker,
            drafts,
            autosave_delay,
            quiz: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn view(&self) -> &View {
        self.navigator.view()
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn autosave_delay(&self) -> Duration {
        self.autosave_delay
    }

    pub fn set_autosave_delay(&mut self, delay: Duration) {
        self.autosave_delay = delay;
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.set_autosave_delay(delay);
        }
    }

    pub fn go_home(&mut self) -> &View {
        self.leave_quiz();
        self.navigator.go_home()
    }

    pub fn select_module(&mut self, module: &str) -> &View {
        self.leave_quiz();
        self.navigator.select_module(&self.catalog, module)
    }

    pub fn select_topic(&mut self, module: &str, topic: &str) -> &View {
        self.leave_quiz();
        self.navigator.select_topic(&self.catalog, module, topic)
    }

    pub fn open(&mut self, id: &TopicId) -> &View {
        self.leave_quiz();
        self.navigator.open(&self.catalog, id)
    }

    /// Enter the quiz of `id`, resuming its saved draft.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoQuiz` if the topic has no questions; the
    /// view is left unchanged.
    pub async fn start_quiz(&mut self, id: &TopicId) -> Result<&QuizSession, QuizSessionError> {
        let questions = self
            .catalog
            .resolve(id)
            .map(|topic| topic.questions().to_vec())
            .unwrap_or_default();
        if !self.navigator.start_quiz(&self.catalog, id) {
            return Err(QuizSessionError::NoQuiz { id: id.clone() });
        }
        self.leave_quiz();
        let session = QuizSession::start(
            id.clone(),
            questions,
            Arc::clone(&self.drafts),
            self.autosave_delay,
            self.clock,
        )
        .await;
        Ok(&*self.quiz.insert(session))
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::NoActiveQuiz` outside a quiz, or the
    /// engine's rejection of the answer.
    pub fn answer(&mut self, question: usize, option: usize) -> Result<(), QuizSessionError> {
        let quiz = self.quiz.as_mut().ok_or(QuizSessionError::NoActiveQuiz)?;
        quiz.select_answer(question, option)?;
        Ok(())
    }

    /// Score the active quiz and store the result.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoActiveQuiz` outside a quiz, or
    /// `QuizError::Incomplete` while questions are unanswered.
    pub async fn submit_quiz(&mut self) -> Result<(QuizResult, QuizScoreRecord), QuizSessionError> {
        let quiz = self.quiz.as_mut().ok_or(QuizSessionError::NoActiveQuiz)?;
        let result = quiz.submit()?;
        let id = quiz.id().clone();
        let record = self.tracker.record_quiz_score(id, &result).await;
        Ok((result, record))
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::NoActiveQuiz` outside a quiz.
    pub async fn retry_quiz(&mut self) -> Result<(), QuizSessionError> {
        let quiz = self.quiz.as_mut().ok_or(QuizSessionError::NoActiveQuiz)?;
        quiz.retry().await;
        Ok(())
    }

    /// Back to the view the quiz was started from.
    pub fn exit_quiz(&mut self) -> &View {
        self.leave_quiz();
        self.navigator.exit_quiz()
    }

    /// Mark `id` completed, then move on to the next topic (or home).
    pub async fn complete_topic(&mut self, id: &TopicId) -> &View {
        self.leave_quiz();
        self.tracker.mark_completed(id.clone()).await;
        let view = self.navigator.complete_topic(&self.catalog, id);
        log::debug!("completed {id}, now at {view:?}");
        view
    }

    pub async fn toggle_bookmark(&mut self, id: &TopicId) -> bool {
        self.tracker.toggle_bookmark(id.clone()).await
    }

    #[must_use]
    pub fn overall_progress(&self) -> u8 {
        self.tracker.overall_progress(&self.catalog)
    }

    #[must_use]
    pub fn module_progress(&self, module: &str) -> u8 {
        self.tracker.module_progress(&self.catalog, module)
    }

    fn leave_quiz(&mut self) {
        if let Some(mut quiz) = self.quiz.take() {
            quiz.close();
        }
    }
}
