use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ItemId;

/// Read-only view of every stored record, keyed by item.
pub type ProgressSnapshot = HashMap<ItemId, ProgressRecord>;

/// Per-item mastery record.
///
/// Created lazily on the first answer and kept for the lifetime of the store.
/// `streak` never exceeds `correct_count`; the two counters only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub item_id: ItemId,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub streak: u32,
    /// `None` until the item is answered for the first time.
    pub last_reviewed: Option<DateTime<Utc>>,
    /// The item is due once `now >= next_review`.
    pub next_review: DateTime<Utc>,
}

impl ProgressRecord {
    /// Zeroed record for an item that has never been answered.
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            correct_count: 0,
            incorrect_count: 0,
            streak: 0,
            last_reviewed: None,
            next_review: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Total answers recorded for the item.
    #[must_use]
    pub fn total_answers(&self) -> u64 {
        u64::from(self.correct_count) + u64::from(self.incorrect_count)
    }

    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// Failed on the last answer (and has at least one failure on record).
    #[must_use]
    pub fn is_recently_failed(&self) -> bool {
        self.streak == 0 && self.incorrect_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn new_record_is_zeroed_and_due() {
        let record = ProgressRecord::new(ItemId::new("a").unwrap());
        assert_eq!(record.total_answers(), 0);
        assert_eq!(record.last_reviewed, None);
        assert!(record.is_due(fixed_now()));
        assert!(!record.is_recently_failed());
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = ProgressRecord::new(ItemId::new("a").unwrap());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["itemId"], "a");
        assert_eq!(json["correctCount"], 0);
        assert!(json["lastReviewed"].is_null());
    }
}
