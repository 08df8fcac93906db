use chrono::{DateTime, Utc};
use quiz_core::question::Question;

/// Final numbers of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    /// Percent correct, `0.0` for an empty quiz.
    pub accuracy: f64,
    /// Consecutive correct answers the quiz ended on.
    pub final_streak: u32,
    pub completed_at: DateTime<Utc>,
}

impl QuizSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(score: usize, total: usize, final_streak: u32, completed_at: DateTime<Utc>) -> Self {
        let accuracy = if total > 0 {
            score as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            score,
            total,
            accuracy,
            final_streak,
            completed_at,
        }
    }
}

/// Where a quiz currently stands.
///
/// `Idle -> Loading -> Question -> Feedback -> (Question | Summary)`; any state
/// may reset to `Idle`, and a finished quiz may start loading again.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuizState {
    #[default]
    Idle,
    Loading,
    Question {
        index: usize,
        total: usize,
        question: Question,
        score: usize,
        streak: u32,
    },
    Feedback {
        index: usize,
        total: usize,
        question: Question,
        selected: String,
        is_correct: bool,
        score: usize,
        streak: u32,
    },
    Summary(QuizSummary),
}

impl QuizState {
    /// Short lowercase name, used in error messages and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Question { .. } => "asking a question",
            Self::Feedback { .. } => "showing feedback",
            Self::Summary(_) => "showing the summary",
        }
    }

    /// The question being asked or reviewed, if any.
    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        match self {
            Self::Question { question, .. } | Self::Feedback { question, .. } => Some(question),
            _ => None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&QuizSummary> {
        match self {
            Self::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn summary_accuracy_handles_empty_quiz() {
        assert!((QuizSummary::new(7, 10, 2, fixed_now()).accuracy - 70.0).abs() < 1e-9);
        assert!(QuizSummary::new(0, 0, 0, fixed_now()).accuracy.abs() < f64::EPSILON);
    }

    #[test]
    fn default_state_is_idle() {
        let state = QuizState::default();
        assert!(state.is_idle());
        assert!(state.question().is_none());
        assert_eq!(state.name(), "idle");
    }
}
