use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
        .bind(version)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Applies pending schema versions in order.
///
/// Version 1 creates the catalog tables (custom sets and items), per-item
/// progress, the single-row stats table, and the quiz history.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if is_applied(pool, 1).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS item_sets (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                is_custom INTEGER NOT NULL CHECK (is_custom IN (0, 1))
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    // set_id is not a foreign key: items may live in the implicit default set
    // or in a static set that has no row here.
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                set_id TEXT NOT NULL,
                kanji TEXT NOT NULL,
                readings TEXT NOT NULL,
                meanings TEXT NOT NULL,
                examples TEXT NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    // Timestamps are unix milliseconds: review dates can lie past year 9999.
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS progress (
                item_id TEXT PRIMARY KEY,
                correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                incorrect_count INTEGER NOT NULL CHECK (incorrect_count >= 0),
                streak INTEGER NOT NULL CHECK (streak >= 0 AND streak <= correct_count),
                last_reviewed_ms INTEGER,
                next_review_ms INTEGER NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS user_stats (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                total_answered INTEGER NOT NULL CHECK (total_answered >= 0),
                correct_answers INTEGER NOT NULL CHECK (correct_answers >= 0),
                current_streak INTEGER NOT NULL CHECK (current_streak >= 0),
                best_streak INTEGER NOT NULL CHECK (best_streak >= 0)
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS quiz_results (
                id INTEGER PRIMARY KEY,
                total INTEGER NOT NULL CHECK (total >= 0),
                correct INTEGER NOT NULL CHECK (correct >= 0 AND correct <= total),
                completed_at TEXT NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_set ON items (set_id, id);")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_quiz_results_completed ON quiz_results (completed_at);",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(1_i64)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::debug!(version = 1, "applied schema migration");

    Ok(())
}
