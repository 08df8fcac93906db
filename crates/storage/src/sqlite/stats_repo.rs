use quiz_core::model::UserStats;

use super::SqliteRepository;
use super::mapping::{conn, map_stats_row, u64_to_i64};
use crate::repository::{StatsRepository, StorageError};

#[async_trait::async_trait]
impl StatsRepository for SqliteRepository {
    async fn get_stats(&self) -> Result<UserStats, StorageError> {
        let row = sqlx::query(
            r"
            SELECT total_answered, correct_answers, current_streak, best_streak
            FROM user_stats WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => map_stats_row(&row),
            None => Ok(UserStats::default()),
        }
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_stats (id, total_answered, correct_answers, current_streak, best_streak)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                total_answered = excluded.total_answered,
                correct_answers = excluded.correct_answers,
                current_streak = excluded.current_streak,
                best_streak = excluded.best_streak
            ",
        )
        .bind(u64_to_i64("total_answered", stats.total_answered)?)
        .bind(u64_to_i64("correct_answers", stats.correct_answers)?)
        .bind(i64::from(stats.current_streak))
        .bind(i64::from(stats.best_streak))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
