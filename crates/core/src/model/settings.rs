use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("questions per quiz must be > 0")]
    InvalidQuestionsPerQuiz,

    #[error("a question needs at least 2 options, got {0}")]
    InvalidOptionCount(usize),
}

/// Shape of a quiz: how many questions and how many choices each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    questions_per_quiz: u32,
    option_count: usize,
}

impl QuizSettings {
    pub const DEFAULT_QUESTIONS_PER_QUIZ: u32 = 10;
    pub const DEFAULT_OPTION_COUNT: usize = 4;

    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuestionsPerQuiz` for zero questions and
    /// `InvalidOptionCount` for fewer than two options.
    pub fn new(questions_per_quiz: u32, option_count: usize) -> Result<Self, QuizSettingsError> {
        if questions_per_quiz == 0 {
            return Err(QuizSettingsError::InvalidQuestionsPerQuiz);
        }
        if option_count < 2 {
            return Err(QuizSettingsError::InvalidOptionCount(option_count));
        }
        Ok(Self {
            questions_per_quiz,
            option_count,
        })
    }

    #[must_use]
    pub fn questions_per_quiz(&self) -> u32 {
        self.questions_per_quiz
    }

    /// Questions per quiz as a length.
    #[must_use]
    pub fn question_limit(&self) -> usize {
        usize::try_from(self.questions_per_quiz).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.option_count
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            questions_per_quiz: Self::DEFAULT_QUESTIONS_PER_QUIZ,
            option_count: Self::DEFAULT_OPTION_COUNT,
        }
    }
}
