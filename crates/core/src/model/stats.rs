use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

/// Lifetime statistics across all quizzes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_answered: u64,
    pub correct_answers: u64,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl UserStats {
    /// Fold a finished quiz into the lifetime totals.
    ///
    /// `final_streak` is the streak of consecutive correct answers the quiz
    /// ended on; it replaces the current streak and may raise the best one.
    pub fn record_quiz(&mut self, result: &QuizResult, final_streak: u32) {
        self.total_answered = self.total_answered.saturating_add(u64::from(result.total()));
        self.correct_answers = self
            .correct_answers
            .saturating_add(u64::from(result.correct()));
        self.current_streak = final_streak;
        self.best_streak = self.best_streak.max(final_streak);
    }

    /// Percentage of correct answers, `0.0` when nothing was answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        percent(self.correct_answers as f64, self.total_answered as f64)
    }
}

/// Entry of the quiz history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    total: u32,
    correct: u32,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Build a result, checking that the score fits the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::CountMismatch` if `correct > total`.
    pub fn new(
        total: u32,
        correct: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if correct > total {
            return Err(QuizResultError::CountMismatch { correct, total });
        }
        Ok(Self {
            total,
            correct,
            completed_at,
        })
    }

    /// Build a result from a question count held as `usize`.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::TooManyQuestions` if the counts do not fit in
    /// `u32`, or `CountMismatch` as for [`QuizResult::new`].
    pub fn from_counts(
        total: usize,
        correct: usize,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        let total_u32 =
            u32::try_from(total).map_err(|_| QuizResultError::TooManyQuestions { len: total })?;
        let correct_u32 =
            u32::try_from(correct).map_err(|_| QuizResultError::TooManyQuestions { len: correct })?;
        Self::new(total_u32, correct_u32, completed_at)
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        percent(f64::from(self.correct), f64::from(self.total))
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
