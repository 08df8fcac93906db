use quiz_core::model::{ItemSet, SetId};

use super::SqliteRepository;
use super::mapping::{conn, map_set_row};
use crate::repository::{ItemSetRepository, StorageError};

#[async_trait::async_trait]
impl ItemSetRepository for SqliteRepository {
    async fn upsert_set(&self, set: &ItemSet) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO item_sets (id, title, is_custom)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                is_custom = excluded.is_custom
            ",
        )
        .bind(set.id().as_str())
        .bind(set.title())
        .bind(i64::from(set.is_custom()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_set(&self, id: &SetId) -> Result<ItemSet, StorageError> {
        let row = sqlx::query("SELECT id, title, is_custom FROM item_sets WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_set_row(&row)
    }

    async fn list_sets(&self) -> Result<Vec<ItemSet>, StorageError> {
        let rows = sqlx::query("SELECT id, title, is_custom FROM item_sets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_set_row).collect()
    }

    async fn delete_set(&self, id: &SetId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM item_sets WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
