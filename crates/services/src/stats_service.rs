use std::sync::Arc;

use quiz_core::model::{ProgressRecord, UserStats};
use storage::repository::{ProgressRepository, QuizResultRepository, QuizResultRow, StatsRepository};

use crate::Clock;
use crate::error::StatsServiceError;

/// Dashboard numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsOverview {
    pub stats: UserStats,
    /// Percent of all answers that were correct.
    pub accuracy: f64,
    /// Items answered correctly at least once.
    pub items_seen: usize,
    /// Items whose next review is due now.
    pub due_now: usize,
    /// Most-missed items first.
    pub review_priority: Vec<ProgressRecord>,
}

/// Read-only view over lifetime statistics and quiz history.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    stats: Arc<dyn StatsRepository>,
    progress: Arc<dyn ProgressRepository>,
    results: Arc<dyn QuizResultRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        stats: Arc<dyn StatsRepository>,
        progress: Arc<dyn ProgressRepository>,
        results: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            clock,
            stats,
            progress,
            results,
        }
    }

    /// Lifetime totals plus the `priority_limit` most-missed items.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn overview(&self, priority_limit: usize) -> Result<StatsOverview, StatsServiceError> {
        let stats = self.stats.get_stats().await?;
        let snapshot = self.progress.all_progress().await?;
        let now = self.clock.now();

        let items_seen = snapshot.values().filter(|p| p.correct_count > 0).count();
        let due_now = snapshot.values().filter(|p| p.is_due(now)).count();

        let mut review_priority: Vec<ProgressRecord> = snapshot.into_values().collect();
        review_priority.sort_by(|a, b| {
            b.incorrect_count
                .cmp(&a.incorrect_count)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        review_priority.truncate(priority_limit);

        Ok(StatsOverview {
            accuracy: stats.accuracy(),
            stats,
            items_seen,
            due_now,
            review_priority,
        })
    }

    /// Most recent quiz results first.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn history(&self, limit: u32) -> Result<Vec<QuizResultRow>, StatsServiceError> {
        Ok(self.results.list_results(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use quiz_core::model::{ItemId, QuizResult};
    use quiz_core::time::fixed_now;
    use quiz_core::tracker::record_answer;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn overview_ranks_missed_items_first() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let a = ItemId::new("a").unwrap();
        let b = ItemId::new("b").unwrap();
        let c = ItemId::new("c").unwrap();

        let good = record_answer(None, &a, true, now);
        let bad = record_answer(None, &b, false, now);
        let worse = record_answer(Some(&record_answer(None, &c, false, now)), &c, false, now);
        for r in [&good, &bad, &worse] {
            repo.upsert_progress(r).await.unwrap();
        }
        repo.save_stats(&UserStats {
            total_answered: 4,
            correct_answers: 1,
            current_streak: 0,
            best_streak: 1,
        })
        .await
        .unwrap();

        let svc = StatsService::new(
            Clock::fixed(now),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let overview = svc.overview(2).await.unwrap();

        assert_eq!(overview.items_seen, 1);
        assert_eq!(overview.due_now, 2);
        assert!((overview.accuracy - 25.0).abs() < f64::EPSILON);
        let ids: Vec<&str> = overview
            .review_priority
            .iter()
            .map(|p| p.item_id.as_str())
            .collect();
        assert_eq!(ids, ["c", "b"]);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let repo = InMemoryRepository::new();
        for day in 0..3 {
            let result = QuizResult::new(10, day, fixed_now() + Duration::days(i64::from(day))).unwrap();
            repo.append_result(&result).await.unwrap();
        }
        let svc = StatsService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );

        let history = svc.history(2).await.unwrap();
        let scores: Vec<u32> = history.iter().map(|r| r.result.correct()).collect();
        assert_eq!(scores, [2, 1]);
    }
}
