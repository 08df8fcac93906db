use std::sync::Arc;

use quiz_core::model::{ItemId, ProgressRecord, ProgressSnapshot};
use quiz_core::tracker;
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::ProgressServiceError;

/// Applies answers to stored progress records.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Every stored record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if records cannot be read.
    pub async fn snapshot(&self) -> Result<ProgressSnapshot, ProgressServiceError> {
        Ok(self.progress.all_progress().await?)
    }

    /// Read-modify-write one item's record and return the stored value.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the record cannot be read or
    /// written.
    pub async fn record_answer(
        &self,
        item_id: &ItemId,
        is_correct: bool,
    ) -> Result<ProgressRecord, ProgressServiceError> {
        let existing = self.progress.get_progress(item_id).await?;
        let updated = tracker::record_answer(existing.as_ref(), item_id, is_correct, self.clock.now());
        self.progress.upsert_progress(&updated).await?;
        tracing::debug!(
            item = %item_id,
            is_correct,
            streak = updated.streak,
            next_review = %updated.next_review,
            "progress updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn answers_accumulate_in_storage() {
        let repo = InMemoryRepository::new();
        let svc = ProgressService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()));
        let id = ItemId::new("n5-1").unwrap();

        let first = svc.record_answer(&id, true).await.unwrap();
        assert_eq!(first.next_review, fixed_now() + Duration::days(1));

        let second = svc.record_answer(&id, true).await.unwrap();
        assert_eq!(second.streak, 2);
        assert_eq!(second.next_review, fixed_now() + Duration::days(2));

        let third = svc.record_answer(&id, false).await.unwrap();
        assert_eq!(third.streak, 0);
        assert_eq!(third.correct_count, 2);
        assert_eq!(third.incorrect_count, 1);

        let snapshot = svc.snapshot().await.unwrap();
        assert_eq!(snapshot.get(&id), Some(&third));
    }
}
