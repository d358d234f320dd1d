use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog::QuizQuestion;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz is incomplete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("quiz has already been submitted")]
    AlreadySubmitted,

    #[error("quiz has not been submitted yet")]
    NotSubmitted,

    #[error("question {index} does not exist")]
    QuestionOutOfRange { index: usize },

    #[error("option {option} does not exist for question {question}")]
    OptionOutOfRange { question: usize, option: usize },
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Selected option per question index.
///
/// Serialises as a JSON object keyed by the stringified question index,
/// e.g. `{"0": 1, "2": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizAnswers(BTreeMap<usize, usize>);

impl QuizAnswers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, question: usize) -> Option<usize> {
        self.0.get(&question).copied()
    }

    pub fn set(&mut self, question: usize, option: usize) {
        self.0.insert(question, option);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(q, o)| (*q, *o))
    }

    /// Drops entries that do not address a question/option of `questions`.
    #[must_use]
    pub fn retain_valid(mut self, questions: &[QuizQuestion]) -> Self {
        self.0.retain(|question, option| {
            questions
                .get(*question)
                .is_some_and(|q| *option < q.options().len())
        });
        self
    }
}

impl FromIterator<(usize, usize)> for QuizAnswers {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Verdict shown next to a submitted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    StudyMore,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            _ => ScoreBand::StudyMore,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent!",
            ScoreBand::Good => "Good",
            ScoreBand::StudyMore => "Study more",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    pub band: ScoreBand,
}

impl QuizResult {
    #[must_use]
    pub fn new(score: usize, total: usize) -> Self {
        let percentage = percentage(score, total);
        Self {
            score,
            total,
            percentage,
            band: ScoreBand::from_percentage(percentage),
        }
    }
}

/// `round(100 * part / whole)`, or 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    let rounded = (part * 100 + whole / 2) / whole;
    u8::try_from(rounded).unwrap_or(100)
}

/// Last submitted score for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScoreRecord {
    pub score: usize,
    pub total: usize,
    pub date: DateTime<Utc>,
}

/// How a single option should be marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Selected,
    Unselected,
    Correct,
    Incorrect,
    Neutral,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    Reviewing,
}

/// One pass through a quiz: answer collection, scoring and retry.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    questions: Vec<QuizQuestion>,
    answers: QuizAnswers,
    phase: QuizPhase,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self::resume(questions, QuizAnswers::new())
    }

    /// Resume from a saved draft; entries that no longer fit the questions are dropped.
    #[must_use]
    pub fn resume(questions: Vec<QuizQuestion>, draft: QuizAnswers) -> Self {
        let answers = draft.retain_valid(&questions);
        Self {
            questions,
            answers,
            phase: QuizPhase::Answering,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &QuizAnswers {
        &self.answers
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn show_results(&self) -> bool {
        self.phase == QuizPhase::Reviewing
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Record an answer, replacing any earlier one for the question.
    ///
    /// Returns `Ok(true)` when the stored answers changed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` while reviewing, or an
    /// out-of-range error for unknown question/option indices.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<bool, QuizError> {
        if self.phase == QuizPhase::Reviewing {
            return Err(QuizError::AlreadySubmitted);
        }
        let q = self
            .questions
            .get(question)
            .ok_or(QuizError::QuestionOutOfRange { index: question })?;
        if option >= q.options().len() {
            return Err(QuizError::OptionOutOfRange { question, option });
        }
        if self.answers.get(question) == Some(option) {
            return Ok(false);
        }
        self.answers.set(question, option);
        Ok(true)
    }

    /// True when every question has exactly one answer.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::Answering
            && !self.questions.is_empty()
            && (0..self.questions.len()).all(|idx| self.answers.get(idx).is_some())
    }

    /// Move to review and return the scored result.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Incomplete` if any question is unanswered, or
    /// `QuizError::AlreadySubmitted` when already reviewing. State is left
    /// untouched on error.
    pub fn submit(&mut self) -> Result<QuizResult, QuizError> {
        if self.phase == QuizPhase::Reviewing {
            return Err(QuizError::AlreadySubmitted);
        }
        if !self.can_submit() {
            return Err(QuizError::Incomplete {
                answered: self.answers.len(),
                total: self.total(),
            });
        }
        self.phase = QuizPhase::Reviewing;
        Ok(self.result())
    }

    /// Number of answers matching the correct option.
    #[must_use]
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .enumerate()
            .filter(|(idx, q)| self.answers.get(*idx) == Some(q.correct()))
            .count()
    }

    #[must_use]
    pub fn result(&self) -> QuizResult {
        QuizResult::new(self.score(), self.total())
    }

    /// Clear all answers and return to answering.
    pub fn retry(&mut self) {
        self.answers.clear();
        self.phase = QuizPhase::Answering;
    }

    #[must_use]
    pub fn option_mark(&self, question: usize, option: usize) -> OptionMark {
        let selected = self.answers.get(question) == Some(option);
        match self.phase {
            QuizPhase::Answering if selected => OptionMark::Selected,
            QuizPhase::Answering => OptionMark::Unselected,
            QuizPhase::Reviewing => {
                let correct = self
                    .questions
                    .get(question)
                    .is_some_and(|q| q.correct() == option);
                if correct {
                    OptionMark::Correct
                } else if selected {
                    OptionMark::Incorrect
                } else {
                    OptionMark::Neutral
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[usize]) -> Vec<QuizQuestion> {
        correct
            .iter()
            .map(|c| {
                QuizQuestion::new("Q", vec!["a".into(), "b".into(), "c".into()], *c).unwrap()
            })
            .collect()
    }

    fn answered(correct: &[usize], answers: &[(usize, usize)]) -> QuizAttempt {
        let mut attempt = QuizAttempt::new(questions(correct));
        for (q, o) in answers {
            attempt.select_answer(*q, *o).unwrap();
        }
        attempt
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let attempt = answered(&[1, 0, 2], &[(0, 1), (1, 0), (2, 2)]);
        assert_eq!(attempt.score(), 3);
    }

    #[test]
    fn one_wrong_answer_scores_two() {
        let attempt = answered(&[1, 0, 2], &[(0, 0), (1, 0), (2, 2)]);
        assert_eq!(attempt.score(), 2);
    }

    #[test]
    fn no_matches_scores_zero() {
        let attempt = answered(&[1, 0, 2], &[(0, 0), (1, 1), (2, 0)]);
        assert_eq!(attempt.score(), 0);
    }

    #[test]
    fn last_selection_wins() {
        let mut attempt = answered(&[1], &[(0, 0)]);
        assert!(attempt.select_answer(0, 1).unwrap());
        assert!(!attempt.select_answer(0, 1).unwrap());
        assert_eq!(attempt.answers().get(0), Some(1));
        assert_eq!(attempt.answers().len(), 1);
    }

    #[test]
    fn submit_requires_every_answer() {
        let mut attempt = answered(&[1, 0, 2], &[(0, 1), (2, 2)]);
        assert!(!attempt.can_submit());
        assert_eq!(
            attempt.submit(),
            Err(QuizError::Incomplete {
                answered: 2,
                total: 3
            })
        );
        assert_eq!(attempt.phase(), QuizPhase::Answering);

        attempt.select_answer(1, 0).unwrap();
        let result = attempt.submit().unwrap();
        assert_eq!(attempt.phase(), QuizPhase::Reviewing);
        assert_eq!(result.score, 3);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.band, ScoreBand::Excellent);
    }

    #[test]
    fn selection_is_ignored_while_reviewing() {
        let mut attempt = answered(&[1], &[(0, 1)]);
        attempt.submit().unwrap();
        assert_eq!(attempt.select_answer(0, 0), Err(QuizError::AlreadySubmitted));
        assert_eq!(attempt.answers().get(0), Some(1));
        assert_eq!(attempt.submit(), Err(QuizError::AlreadySubmitted));
    }

    #[test]
    fn retry_clears_answers() {
        let mut attempt = answered(&[1, 0], &[(0, 1), (1, 0)]);
        attempt.submit().unwrap();
        attempt.retry();
        assert_eq!(attempt.phase(), QuizPhase::Answering);
        assert!(attempt.answers().is_empty());
        assert_eq!(attempt.score(), 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut attempt = QuizAttempt::new(questions(&[0]));
        assert_eq!(
            attempt.select_answer(3, 0),
            Err(QuizError::QuestionOutOfRange { index: 3 })
        );
        assert_eq!(
            attempt.select_answer(0, 7),
            Err(QuizError::OptionOutOfRange {
                question: 0,
                option: 7
            })
        );
    }

    #[test]
    fn resume_drops_stale_draft_entries() {
        let draft: QuizAnswers = [(0, 2), (1, 9), (5, 0)].into_iter().collect();
        let attempt = QuizAttempt::resume(questions(&[2, 0]), draft);
        assert_eq!(attempt.answers().len(), 1);
        assert_eq!(attempt.answers().get(0), Some(2));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn score_bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_percentage(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percentage(79), ScoreBand::Good);
        assert_eq!(ScoreBand::from_percentage(60), ScoreBand::Good);
        assert_eq!(ScoreBand::from_percentage(59), ScoreBand::StudyMore);
    }

    #[test]
    fn option_marks_reflect_phase() {
        let mut attempt = answered(&[1], &[(0, 0)]);
        assert_eq!(attempt.option_mark(0, 0), OptionMark::Selected);
        assert_eq!(attempt.option_mark(0, 1), OptionMark::Unselected);
        attempt.submit().unwrap();
        assert_eq!(attempt.option_mark(0, 0), OptionMark::Incorrect);
        assert_eq!(attempt.option_mark(0, 1), OptionMark::Correct);
        assert_eq!(attempt.option_mark(0, 2), OptionMark::Neutral);
    }

    #[test]
    fn answers_serialize_with_string_keys() {
        let answers: QuizAnswers = [(0, 1), (2, 3)].into_iter().collect();
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"0":1,"2":3}"#);
        let back: QuizAnswers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
