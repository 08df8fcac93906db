use quiz_core::model::{QuizResult, QuizResultId};

use super::SqliteRepository;
use super::mapping::{conn, map_result_row, map_result_row_with_id};
use crate::repository::{QuizResultRepository, QuizResultRow, StorageError};

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<QuizResultId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (total, correct, completed_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(i64::from(result.total()))
        .bind(i64::from(result.correct()))
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_result(&self, id: QuizResultId) -> Result<QuizResult, StorageError> {
        let row = sqlx::query(
            r"
                SELECT total, correct, completed_at
                FROM quiz_results
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<QuizResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, total, correct, completed_at
                FROM quiz_results
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row_with_id).collect()
    }
}
