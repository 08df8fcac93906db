//! Session selection: choose which items fill the next quiz, in order.
//!
//! Each item gets an additive weight (overdue and recently failed items
//! dominate, unseen items get a small boost), plus uniform noise so the order
//! cannot be memorised. The highest noised weights win.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::model::{Item, ProgressRecord, ProgressSnapshot};

//
// ─── WEIGHTS ───────────────────────────────────────────────────────────────────
//

/// Additive weights used to rank candidates.
///
/// With the defaults an overdue item scores at least `1 + 10 = 11`, while an
/// item that is neither overdue nor failed scores below `1 + 2 + 5 = 8` even
/// with maximal noise, so overdue items always win a slot first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWeights {
    pub base: f64,
    pub overdue: f64,
    pub recently_failed: f64,
    pub unseen: f64,
    /// Noise is drawn uniformly from `[0, noise)`.
    pub noise: f64,
}

impl SelectionWeights {
    /// Weight of an item before noise.
    #[must_use]
    pub fn base_weight(&self, record: Option<&ProgressRecord>, now: DateTime<Utc>) -> f64 {
        let mut weight = self.base;
        match record {
            Some(record) => {
                if record.is_due(now) {
                    weight += self.overdue;
                }
                if record.is_recently_failed() {
                    weight += self.recently_failed;
                }
            }
            None => weight += self.unseen,
        }
        weight
    }
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            overdue: 10.0,
            recently_failed: 5.0,
            unseen: 2.0,
            noise: 5.0,
        }
    }
}

/// An item paired with its selection weight. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub item: &'a Item,
    pub weight: f64,
}

//
// ─── SELECTOR ──────────────────────────────────────────────────────────────────
//

/// Weighted, noisy-sort session selector.
///
/// Holds only its weights; every call works on the snapshot it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionSelector {
    weights: SelectionWeights,
}

impl SessionSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weights(weights: SelectionWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &SelectionWeights {
        &self.weights
    }

    /// Noise-free weights for every item of the pool, in pool order.
    #[must_use]
    pub fn candidates<'a>(
        &self,
        pool: &'a [Item],
        progress: &ProgressSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Candidate<'a>> {
        pool.iter()
            .map(|item| Candidate {
                item,
                weight: self.weights.base_weight(progress.get(item.id()), now),
            })
            .collect()
    }

    /// Pick up to `count` items using the given random source.
    ///
    /// Returns `min(count, pool.len())` items ordered by descending noised
    /// weight; that order is the question order of the quiz. Neither `pool`
    /// nor `progress` is modified.
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        pool: &[Item],
        count: usize,
        progress: &ProgressSnapshot,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Item> {
        if count == 0 || pool.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<Candidate<'_>> = self
            .candidates(pool, progress, now)
            .into_iter()
            .map(|candidate| Candidate {
                weight: candidate.weight + rng.random::<f64>() * self.weights.noise,
                ..candidate
            })
            .collect();

        scored.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        scored.truncate(count);
        scored.into_iter().map(|c| c.item.clone()).collect()
    }

    /// Pick up to `count` items using the thread-local random source.
    #[must_use]
    pub fn select(
        &self,
        pool: &[Item],
        count: usize,
        progress: &ProgressSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Item> {
        self.select_with_rng(pool, count, progress, now, &mut rand::rng())
    }
}

/// Select the items of the next quiz with default weights.
///
/// ```
/// # use quiz_core::selector::select_items;
/// # use quiz_core::model::ProgressSnapshot;
/// let picked = select_items(&[], 10, &ProgressSnapshot::new(), chrono::Utc::now());
/// assert!(picked.is_empty());
/// ```
#[must_use]
pub fn select_items(
    pool: &[Item],
    count: usize,
    progress: &ProgressSnapshot,
    now: DateTime<Utc>,
) -> Vec<Item> {
    SessionSelector::default().select(pool, count, progress, now)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
