use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a catalog item.
///
/// Built-in items use the identifiers shipped in the catalog files; custom
/// items get a random UUID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates an `ItemId` from a raw string.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the identifier is empty after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError { kind: "ItemId" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Fresh random identifier for user-authored items.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of an item set (a group such as `n5` or a custom set).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetId(String);

impl SetId {
    /// Creates a `SetId` from a raw string.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the identifier is empty after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError { kind: "SetId" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub(crate) fn builtin(id: &'static str) -> Self {
        Self(id.to_owned())
    }

    /// Set that custom items fall back to when they carry no set.
    #[must_use]
    pub fn custom_default() -> Self {
        Self("custom-default".to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Row identifier of a persisted quiz result.
pub type QuizResultId = i64;

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Debug for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cannot be empty", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for ItemId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for SetId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for SetId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl From<SetId> for String {
    fn from(id: SetId) -> Self {
        id.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_trims_and_displays() {
        let id = ItemId::new("  n5-001 ").unwrap();
        assert_eq!(id.to_string(), "n5-001");
        assert_eq!(format!("{id:?}"), "ItemId(n5-001)");
    }

    #[test]
    fn item_id_rejects_blank() {
        assert!("   ".parse::<ItemId>().is_err());
        assert!(ItemId::new("").is_err());
    }

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(ItemId::random(), ItemId::random());
        assert_ne!(SetId::random(), SetId::random());
    }

    #[test]
    fn set_id_from_str() {
        let id: SetId = "n4".parse().unwrap();
        assert_eq!(id.as_str(), "n4");
        let err = "".parse::<SetId>().unwrap_err();
        assert_eq!(err.to_string(), "SetId cannot be empty");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ItemId::new("k-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"k-1\"");
        assert!(serde_json::from_str::<ItemId>("\"  \"").is_err());
    }
}
