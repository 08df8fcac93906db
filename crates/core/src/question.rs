//! Multiple-choice question construction for selected items.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::model::{Item, QuizSettings};

/// Direction in which an item is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizMode {
    /// Show the kanji, pick its meaning.
    KanjiToMeaning,
    /// Show the meaning, pick the kanji.
    MeaningToKanji,
}

impl QuizMode {
    /// Either direction with equal probability.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Self::KanjiToMeaning
        } else {
            Self::MeaningToKanji
        }
    }

    /// Text shown to the learner.
    #[must_use]
    pub fn prompt_for(self, item: &Item) -> &str {
        match self {
            Self::KanjiToMeaning => item.kanji(),
            Self::MeaningToKanji => item.primary_meaning(),
        }
    }

    /// Text of the correct option.
    #[must_use]
    pub fn answer_for(self, item: &Item) -> &str {
        match self {
            Self::KanjiToMeaning => item.primary_meaning(),
            Self::MeaningToKanji => item.kanji(),
        }
    }
}

/// A ready-to-ask question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    item: Item,
    mode: QuizMode,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        self.mode.prompt_for(&self.item)
    }

    /// Shuffled options; the correct answer appears exactly once.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Builds multiple-choice questions with a fixed number of options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionBuilder {
    option_count: usize,
}

impl QuestionBuilder {
    /// `option_count` includes the correct answer; values below 1 are raised to 1.
    #[must_use]
    pub fn new(option_count: usize) -> Self {
        Self {
            option_count: option_count.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self::new(settings.option_count())
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.option_count
    }

    /// Question for `item` in a random direction.
    pub fn build<R: Rng + ?Sized>(&self, item: &Item, pool: &[Item], rng: &mut R) -> Question {
        let mode = QuizMode::random(rng);
        self.build_with_mode(item, mode, pool, rng)
    }

    /// Question for `item` in the given direction.
    ///
    /// Distractors are drawn uniformly from the other items of `pool`, skipping
    /// texts equal to the answer and duplicates. A pool that is too small
    /// yields fewer options rather than an error.
    pub fn build_with_mode<R: Rng + ?Sized>(
        &self,
        item: &Item,
        mode: QuizMode,
        pool: &[Item],
        rng: &mut R,
    ) -> Question {
        let correct_answer = mode.answer_for(item).to_owned();

        let mut seen = HashSet::new();
        let candidates: Vec<&str> = pool
            .iter()
            .filter(|other| other.id() != item.id())
            .map(|other| mode.answer_for(other))
            .filter(|text| *text != correct_answer && seen.insert(*text))
            .collect();

        let mut options: Vec<String> = candidates
            .choose_multiple(rng, self.option_count - 1)
            .map(|text| (*text).to_owned())
            .collect();
        options.push(correct_answer.clone());
        options.shuffle(rng);

        Question {
            item: item.clone(),
            mode,
            options,
            correct_answer,
        }
    }

    /// One question per selected item, keeping the selection order.
    pub fn build_all<R: Rng + ?Sized>(
        &self,
        items: &[Item],
        pool: &[Item],
        rng: &mut R,
    ) -> Vec<Question> {
        items.iter().map(|item| self.build(item, pool, rng)).collect()
    }
}

impl Default for QuestionBuilder {
    fn default() -> Self {
        Self::new(QuizSettings::DEFAULT_OPTION_COUNT)
    }
}
