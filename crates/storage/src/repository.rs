use async_trait::async_trait;
use quiz_core::model::{
    Item, ItemId, ItemSet, ProgressRecord, ProgressSnapshot, QuizResult, QuizResultId, SetId,
    UserStats,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored quiz result together with its row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResultRow {
    pub id: QuizResultId,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: QuizResultId, result: QuizResult) -> Self {
        Self { id, result }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// User-authored catalog items. Static catalog items never go through here.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist or replace an item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the item cannot be stored.
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError>;

    /// Fetch an item by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_item(&self, id: &ItemId) -> Result<Item, StorageError>;

    /// List stored items, optionally restricted to one set, ordered by set
    /// then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_items(&self, set_id: Option<&SetId>) -> Result<Vec<Item>, StorageError>;

    /// Delete one item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the item does not exist.
    async fn delete_item(&self, id: &ItemId) -> Result<(), StorageError>;

    /// Delete every item of a set and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_items_in_set(&self, set_id: &SetId) -> Result<u64, StorageError>;
}

/// User-created item sets.
#[async_trait]
pub trait ItemSetRepository: Send + Sync {
    /// Persist or rename a set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn upsert_set(&self, set: &ItemSet) -> Result<(), StorageError>;

    /// Fetch a set by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_set(&self, id: &SetId) -> Result<ItemSet, StorageError>;

    /// List stored sets ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sets(&self) -> Result<Vec<ItemSet>, StorageError>;

    /// Delete a set row. Items are left to the caller.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the set does not exist.
    async fn delete_set(&self, id: &SetId) -> Result<(), StorageError>;
}

/// Per-item mastery records.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Record for one item, `None` if it was never answered.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(&self, item_id: &ItemId) -> Result<Option<ProgressRecord>, StorageError>;

    /// Every stored record, keyed by item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn all_progress(&self) -> Result<ProgressSnapshot, StorageError>;

    /// Insert or overwrite the record for `record.item_id`. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// Lifetime statistics, a single document.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Stored statistics, or zeroed statistics if none were ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_stats(&self) -> Result<UserStats, StorageError>;

    /// Replace the stored statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the statistics cannot be stored.
    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError>;
}

/// Append-only quiz history.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append a result and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError>;

    /// Fetch one result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError>;

    /// Most recent results first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(&self, limit: u32) -> Result<Vec<QuizResultRow>, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<Mutex<HashMap<ItemId, Item>>>,
    sets: Arc<Mutex<HashMap<SetId, ItemSet>>>,
    progress: Arc<Mutex<ProgressSnapshot>>,
    stats: Arc<Mutex<Option<UserStats>>>,
    results: Arc<Mutex<Vec<QuizResultRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError> {
        lock(&self.items)?.insert(item.id().clone(), item.clone());
        Ok(())
    }

    async fn get_item(&self, id: &ItemId) -> Result<Item, StorageError> {
        lock(&self.items)?
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_items(&self, set_id: Option<&SetId>) -> Result<Vec<Item>, StorageError> {
        let guard = lock(&self.items)?;
        let mut items: Vec<Item> = guard
            .values()
            .filter(|item| set_id.is_none_or(|set| item.set_id() == set))
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.set_id(), a.id()).cmp(&(b.set_id(), b.id())));
        Ok(items)
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), StorageError> {
        lock(&self.items)?
            .remove(id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn delete_items_in_set(&self, set_id: &SetId) -> Result<u64, StorageError> {
        let mut guard = lock(&self.items)?;
        let before = guard.len();
        guard.retain(|_, item| item.set_id() != set_id);
        Ok((before - guard.len()) as u64)
    }
}

#[async_trait]
impl ItemSetRepository for InMemoryRepository {
    async fn upsert_set(&self, set: &ItemSet) -> Result<(), StorageError> {
        lock(&self.sets)?.insert(set.id().clone(), set.clone());
        Ok(())
    }

    async fn get_set(&self, id: &SetId) -> Result<ItemSet, StorageError> {
        lock(&self.sets)?
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_sets(&self) -> Result<Vec<ItemSet>, StorageError> {
        let mut sets: Vec<ItemSet> = lock(&self.sets)?.values().cloned().collect();
        sets.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(sets)
    }

    async fn delete_set(&self, id: &SetId) -> Result<(), StorageError> {
        lock(&self.sets)?
            .remove(id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, item_id: &ItemId) -> Result<Option<ProgressRecord>, StorageError> {
        Ok(lock(&self.progress)?.get(item_id).cloned())
    }

    async fn all_progress(&self) -> Result<ProgressSnapshot, StorageError> {
        Ok(lock(&self.progress)?.clone())
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        lock(&self.progress)?.insert(record.item_id.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for InMemoryRepository {
    async fn get_stats(&self) -> Result<UserStats, StorageError> {
        Ok(lock(&self.stats)?.unwrap_or_default())
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        *lock(&self.stats)? = Some(*stats);
        Ok(())
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError> {
        let mut guard = lock(&self.results)?;
        let id = QuizResultId::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("quiz result id overflow".into()))?;
        guard.push(QuizResultRow::new(id, *result));
        Ok(id)
    }

    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError> {
        lock(&self.results)?
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.result)
            .ok_or(StorageError::NotFound)
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<QuizResultRow>, StorageError> {
        let mut rows = lock(&self.results)?.clone();
        rows.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates every repository behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn ItemRepository>,
    pub sets: Arc<dyn ItemSetRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub results: Arc<dyn QuizResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            items: Arc::new(repo.clone()),
            sets: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            stats: Arc::new(repo.clone()),
            results: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::ItemDraft;
    use quiz_core::time::fixed_now;
    use quiz_core::tracker::record_answer;

    fn build_item(id: &str, set: &str) -> Item {
        ItemDraft {
            id: ItemId::new(id).unwrap(),
            kanji: "山".into(),
            readings: vec!["やま".into()],
            meanings: vec!["montaña".into()],
            set_id: Some(SetId::new(set).unwrap()),
            examples: Vec::new(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn progress_upsert_is_last_write_wins() {
        let repo = InMemoryRepository::new();
        let id = ItemId::new("n5-1").unwrap();

        assert!(repo.get_progress(&id).await.unwrap().is_none());

        let first = record_answer(None, &id, true, fixed_now());
        repo.upsert_progress(&first).await.unwrap();
        let second = record_answer(Some(&first), &id, false, fixed_now());
        repo.upsert_progress(&second).await.unwrap();

        let stored = repo.get_progress(&id).await.unwrap().unwrap();
        assert_eq!(stored, second);
        assert_eq!(repo.all_progress().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn items_filter_by_set_and_delete() {
        let repo = InMemoryRepository::new();
        repo.upsert_item(&build_item("b", "mine")).await.unwrap();
        repo.upsert_item(&build_item("a", "mine")).await.unwrap();
        repo.upsert_item(&build_item("c", "other")).await.unwrap();

        let mine = SetId::new("mine").unwrap();
        let listed = repo.list_items(Some(&mine)).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(repo.list_items(None).await.unwrap().len(), 3);

        assert_eq!(repo.delete_items_in_set(&mine).await.unwrap(), 2);
        assert!(matches!(
            repo.delete_item(&ItemId::new("a").unwrap()).await,
            Err(StorageError::NotFound)
        ));
        repo.delete_item(&ItemId::new("c").unwrap()).await.unwrap();
        assert!(repo.list_items(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_default_until_saved() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_stats().await.unwrap(), UserStats::default());

        let stats = UserStats {
            total_answered: 10,
            correct_answers: 7,
            current_streak: 2,
            best_streak: 5,
        };
        repo.save_stats(&stats).await.unwrap();
        assert_eq!(repo.get_stats().await.unwrap(), stats);
    }

    #[tokio::test]
    async fn results_list_newest_first() {
        let repo = InMemoryRepository::new();
        let older = QuizResult::new(10, 4, fixed_now()).unwrap();
        let newer = QuizResult::new(10, 9, fixed_now() + Duration::days(1)).unwrap();

        let older_id = repo.append_result(&older).await.unwrap();
        let newer_id = repo.append_result(&newer).await.unwrap();

        let rows = repo.list_results(10).await.unwrap();
        assert_eq!(
            rows,
            [
                QuizResultRow::new(newer_id, newer),
                QuizResultRow::new(older_id, older)
            ]
        );
        assert_eq!(repo.list_results(1).await.unwrap().len(), 1);
        assert_eq!(repo.get_result(older_id).await.unwrap(), older);
        assert!(matches!(
            repo.get_result(99).await,
            Err(StorageError::NotFound)
        ));
    }
}
