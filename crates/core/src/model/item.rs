use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ItemId, SetId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("kanji cannot be empty")]
    EmptyKanji,

    #[error("item {0} needs at least one meaning")]
    NoMeanings(ItemId),

    #[error("set title cannot be empty")]
    EmptySetTitle,
}

//
// ─── ITEM TYPES ────────────────────────────────────────────────────────────────
//

/// Example sentence attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub japanese: String,
    #[serde(rename = "spanish")]
    pub translation: String,
}

/// Unvalidated item as it appears in catalog files and user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub id: ItemId,
    pub kanji: String,
    #[serde(default)]
    pub readings: Vec<String>,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub set_id: Option<SetId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

impl ItemDraft {
    /// Validate the draft into a catalog item.
    ///
    /// Blank readings and meanings are dropped; a draft without a set lands in
    /// [`SetId::custom_default`].
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyKanji` or `ItemError::NoMeanings`.
    pub fn validate(self) -> Result<Item, ItemError> {
        let kanji = self.kanji.trim().to_owned();
        if kanji.is_empty() {
            return Err(ItemError::EmptyKanji);
        }

        let meanings = normalize_list(self.meanings);
        if meanings.is_empty() {
            return Err(ItemError::NoMeanings(self.id));
        }

        Ok(Item {
            id: self.id,
            set_id: self.set_id.unwrap_or_else(SetId::custom_default),
            kanji,
            readings: normalize_list(self.readings),
            meanings,
            examples: self.examples,
        })
    }
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

/// A validated catalog item.
///
/// Always has a non-empty kanji and at least one meaning; the first meaning is
/// the one quizzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemDraft", into = "ItemDraft")]
pub struct Item {
    id: ItemId,
    set_id: SetId,
    kanji: String,
    readings: Vec<String>,
    meanings: Vec<String>,
    examples: Vec<Example>,
}

impl Item {
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn set_id(&self) -> &SetId {
        &self.set_id
    }

    #[must_use]
    pub fn kanji(&self) -> &str {
        &self.kanji
    }

    #[must_use]
    pub fn readings(&self) -> &[String] {
        &self.readings
    }

    #[must_use]
    pub fn meanings(&self) -> &[String] {
        &self.meanings
    }

    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// The meaning used as the quiz answer.
    #[must_use]
    pub fn primary_meaning(&self) -> &str {
        // validation guarantees at least one meaning
        self.meanings.first().map_or("", String::as_str)
    }

    /// Copy of this item under a fresh id in another set.
    #[must_use]
    pub fn copy_into(&self, set_id: SetId) -> Self {
        Self {
            id: ItemId::random(),
            set_id,
            ..self.clone()
        }
    }

    /// Case-insensitive match against kanji, meanings, and readings.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.kanji.contains(&needle)
            || self.meanings.iter().any(|m| m.to_lowercase().contains(&needle))
            || self.readings.iter().any(|r| r.contains(&needle))
    }
}

impl TryFrom<ItemDraft> for Item {
    type Error = ItemError;

    fn try_from(draft: ItemDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Item> for ItemDraft {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            kanji: item.kanji,
            readings: item.readings,
            meanings: item.meanings,
            set_id: Some(item.set_id),
            examples: item.examples,
        }
    }
}

//
// ─── ITEM SETS ─────────────────────────────────────────────────────────────────
//

/// A named group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSet {
    id: SetId,
    title: String,
    is_custom: bool,
}

impl ItemSet {
    /// Create a validated set.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptySetTitle` if the title is blank.
    pub fn new(id: SetId, title: impl Into<String>, is_custom: bool) -> Result<Self, ItemError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ItemError::EmptySetTitle);
        }
        Ok(Self {
            id,
            title,
            is_custom,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SetId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.is_custom
    }
}

/// Sets shipped with the app.
#[must_use]
pub fn builtin_sets() -> Vec<ItemSet> {
    [("n5", "JLPT N5"), ("n4", "JLPT N4"), ("n3", "JLPT N3")]
        .into_iter()
        .map(|(id, title)| ItemSet {
            id: SetId::builtin(id),
            title: title.to_owned(),
            is_custom: false,
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
