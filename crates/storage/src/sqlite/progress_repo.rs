use quiz_core::model::{ItemId, ProgressRecord, ProgressSnapshot};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, item_id: &ItemId) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT item_id, correct_count, incorrect_count, streak,
                   last_reviewed_ms, next_review_ms
            FROM progress WHERE item_id = ?1
            ",
        )
        .bind(item_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn all_progress(&self) -> Result<ProgressSnapshot, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT item_id, correct_count, incorrect_count, streak,
                   last_reviewed_ms, next_review_ms
            FROM progress
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut snapshot = ProgressSnapshot::with_capacity(rows.len());
        for row in &rows {
            let record = map_progress_row(row)?;
            snapshot.insert(record.item_id.clone(), record);
        }
        Ok(snapshot)
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (
                item_id, correct_count, incorrect_count, streak,
                last_reviewed_ms, next_review_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(item_id) DO UPDATE SET
                correct_count = excluded.correct_count,
                incorrect_count = excluded.incorrect_count,
                streak = excluded.streak,
                last_reviewed_ms = excluded.last_reviewed_ms,
                next_review_ms = excluded.next_review_ms
            ",
        )
        .bind(record.item_id.as_str())
        .bind(i64::from(record.correct_count))
        .bind(i64::from(record.incorrect_count))
        .bind(i64::from(record.streak))
        .bind(record.last_reviewed.map(|t| t.timestamp_millis()))
        .bind(record.next_review.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
