use quiz_core::model::{Item, ItemId, SetId};

use super::SqliteRepository;
use super::mapping::{conn, map_item_row, to_json};
use crate::repository::{ItemRepository, StorageError};

#[async_trait::async_trait]
impl ItemRepository for SqliteRepository {
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO items (id, set_id, kanji, readings, meanings, examples)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                set_id = excluded.set_id,
                kanji = excluded.kanji,
                readings = excluded.readings,
                meanings = excluded.meanings,
                examples = excluded.examples
            ",
        )
        .bind(item.id().as_str())
        .bind(item.set_id().as_str())
        .bind(item.kanji())
        .bind(to_json(item.readings())?)
        .bind(to_json(item.meanings())?)
        .bind(to_json(item.examples())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_item(&self, id: &ItemId) -> Result<Item, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, set_id, kanji, readings, meanings, examples
            FROM items WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_item_row(&row)
    }

    async fn list_items(&self, set_id: Option<&SetId>) -> Result<Vec<Item>, StorageError> {
        let rows = match set_id {
            Some(set_id) => {
                sqlx::query(
                    r"
                    SELECT id, set_id, kanji, readings, meanings, examples
                    FROM items
                    WHERE set_id = ?1
                    ORDER BY set_id ASC, id ASC
                    ",
                )
                .bind(set_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, set_id, kanji, readings, meanings, examples
                    FROM items
                    ORDER BY set_id ASC, id ASC
                    ",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(conn)?;

        rows.iter().map(map_item_row).collect()
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_items_in_set(&self, set_id: &SetId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM items WHERE set_id = ?1")
            .bind(set_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        Ok(res.rows_affected())
    }
}
