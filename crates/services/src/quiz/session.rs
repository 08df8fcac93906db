use chrono::{DateTime, Utc};
use quiz_core::model::{ItemId, QuizResultId};
use quiz_core::question::Question;

use super::state::{QuizState, QuizSummary};
use crate::error::QuizError;

/// What happened when an answer was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub item_id: ItemId,
    pub is_correct: bool,
    pub correct_answer: String,
}

/// Result of moving past a feedback screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Next,
    Finished(QuizSummary),
}

/// In-memory quiz: the fixed question list plus the state machine over it.
///
/// Performs no I/O; [`QuizLoopService`](super::QuizLoopService) drives it and
/// persists progress and results around each transition.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: QuizState,
    questions: Vec<Question>,
    stats_saved: bool,
    result_id: Option<QuizResultId>,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, QuizState::Summary(_))
    }

    /// Row id of the persisted quiz result, once saved.
    #[must_use]
    pub fn result_id(&self) -> Option<QuizResultId> {
        self.result_id
    }

    pub(crate) fn stats_saved(&self) -> bool {
        self.stats_saved
    }

    pub(crate) fn mark_stats_saved(&mut self) {
        self.stats_saved = true;
    }

    pub(crate) fn set_result_id(&mut self, id: QuizResultId) {
        self.result_id = Some(id);
    }

    fn invalid(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// `Idle | Summary -> Loading`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` while a quiz is loading or running.
    pub fn begin_loading(&mut self) -> Result<(), QuizError> {
        match self.state {
            QuizState::Idle | QuizState::Summary(_) => {
                *self = Self {
                    state: QuizState::Loading,
                    ..Self::default()
                };
                Ok(())
            }
            _ => Err(self.invalid("start a quiz")),
        }
    }

    /// `Loading -> Question` with the first question.
    ///
    /// An empty list drops back to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPool` for an empty list and
    /// `QuizError::InvalidTransition` if the quiz is not loading.
    pub fn load(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        if !matches!(self.state, QuizState::Loading) {
            return Err(self.invalid("load questions"));
        }
        let Some(first) = questions.first().cloned() else {
            self.state = QuizState::Idle;
            return Err(QuizError::EmptyPool);
        };

        self.state = QuizState::Question {
            index: 0,
            total: questions.len(),
            question: first,
            score: 0,
            streak: 0,
        };
        self.questions = questions;
        Ok(())
    }

    /// `Loading -> Idle` after a failed load.
    pub fn abandon_loading(&mut self) {
        if matches!(self.state, QuizState::Loading) {
            self.state = QuizState::Idle;
        }
    }

    /// The question awaiting an answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the `Question` state.
    pub fn current_question(&self) -> Result<&Question, QuizError> {
        match &self.state {
            QuizState::Question { question, .. } => Ok(question),
            _ => Err(self.invalid("answer")),
        }
    }

    /// `Question -> Feedback`. Score and streak follow the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the `Question` state.
    pub fn answer(&mut self, selected: &str) -> Result<AnswerOutcome, QuizError> {
        let QuizState::Question {
            index,
            total,
            ref question,
            score,
            streak,
        } = self.state
        else {
            return Err(self.invalid("answer"));
        };
        let question = question.clone();

        let is_correct = question.is_correct(selected);
        let outcome = AnswerOutcome {
            item_id: question.item().id().clone(),
            is_correct,
            correct_answer: question.correct_answer().to_owned(),
        };

        self.state = QuizState::Feedback {
            index,
            total,
            question,
            selected: selected.to_owned(),
            is_correct,
            score: if is_correct { score + 1 } else { score },
            streak: if is_correct { streak.saturating_add(1) } else { 0 },
        };
        Ok(outcome)
    }

    /// `Feedback -> Question` for the next question, or `Feedback -> Summary`
    /// after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the `Feedback` state.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, QuizError> {
        let QuizState::Feedback {
            index,
            total,
            score,
            streak,
            ..
        } = self.state
        else {
            return Err(self.invalid("continue"));
        };

        let next = index + 1;
        match self.questions.get(next) {
            Some(question) if next < total => {
                self.state = QuizState::Question {
                    index: next,
                    total,
                    question: question.clone(),
                    score,
                    streak,
                };
                Ok(Advance::Next)
            }
            _ => {
                let summary = QuizSummary::new(score, total, streak, now);
                self.state = QuizState::Summary(summary);
                Ok(Advance::Finished(summary))
            }
        }
    }

    /// Any state `-> Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Item, ItemDraft};
    use quiz_core::question::{QuestionBuilder, QuizMode};
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn item(n: usize) -> Item {
        ItemDraft {
            id: ItemId::new(format!("k{n}")).unwrap(),
            kanji: format!("字{n}"),
            readings: Vec::new(),
            meanings: vec![format!("m{n}")],
            set_id: None,
            examples: Vec::new(),
        }
        .validate()
        .unwrap()
    }

    fn questions(n: usize) -> Vec<Question> {
        let pool: Vec<Item> = (0..6).map(item).collect();
        let mut rng = StdRng::seed_from_u64(1);
        pool.iter()
            .take(n)
            .map(|i| {
                QuestionBuilder::default().build_with_mode(i, QuizMode::KanjiToMeaning, &pool, &mut rng)
            })
            .collect()
    }

    fn running(n: usize) -> QuizSession {
        let mut session = QuizSession::new();
        session.begin_loading().unwrap();
        session.load(questions(n)).unwrap();
        session
    }

    #[test]
    fn full_run_tracks_score_and_streak() {
        let mut session = running(3);

        let answers = ["m0", "wrong", "m2"];
        for (i, answer) in answers.iter().enumerate() {
            let outcome = session.answer(answer).unwrap();
            assert_eq!(outcome.is_correct, *answer != "wrong");
            let advance = session.advance(fixed_now()).unwrap();
            if i < 2 {
                assert_eq!(advance, Advance::Next);
            } else {
                let Advance::Finished(summary) = advance else {
                    panic!("expected summary");
                };
                assert_eq!(summary.score, 2);
                assert_eq!(summary.total, 3);
                assert_eq!(summary.final_streak, 1);
            }
        }
        assert!(session.is_complete());
    }

    #[test]
    fn feedback_carries_selection_and_counters() {
        let mut session = running(2);
        session.answer("m0").unwrap();
        match session.state() {
            QuizState::Feedback {
                index,
                selected,
                is_correct,
                score,
                streak,
                ..
            } => {
                assert_eq!(*index, 0);
                assert_eq!(selected, "m0");
                assert!(*is_correct);
                assert_eq!((*score, *streak), (1, 1));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn illegal_transitions_are_rejected_without_side_effects() {
        let mut session = QuizSession::new();
        assert!(matches!(
            session.answer("x"),
            Err(QuizError::InvalidTransition { action: "answer", .. })
        ));
        assert!(session.advance(fixed_now()).is_err());
        assert!(session.load(questions(1)).is_err());
        assert!(session.state().is_idle());

        let mut session = running(2);
        assert!(session.begin_loading().is_err());
        assert!(session.advance(fixed_now()).is_err());
        assert_eq!(session.questions().len(), 2);

        session.answer("m0").unwrap();
        assert!(session.answer("m0").is_err());
        assert!(matches!(session.state(), QuizState::Feedback { .. }));
    }

    #[test]
    fn empty_question_list_returns_to_idle() {
        let mut session = QuizSession::new();
        session.begin_loading().unwrap();
        assert!(matches!(session.load(Vec::new()), Err(QuizError::EmptyPool)));
        assert!(session.state().is_idle());
    }

    #[test]
    fn reset_and_restart() {
        let mut session = running(1);
        session.answer("m0").unwrap();
        session.advance(fixed_now()).unwrap();
        session.set_result_id(7);

        session.begin_loading().unwrap();
        assert!(matches!(session.state(), QuizState::Loading));
        assert_eq!(session.result_id(), None);

        session.abandon_loading();
        assert!(session.state().is_idle());

        let mut session = running(2);
        session.reset();
        assert!(session.state().is_idle());
        assert!(session.questions().is_empty());
    }
}
