use chrono::{DateTime, Utc};
use quiz_core::model::{
    Example, Item, ItemDraft, ItemId, ItemSet, ProgressRecord, QuizResult, SetId, UserStats,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuizResultRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn millis_to_datetime(field: &'static str, ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::Serialization(format!("{field} out of range: {ms}")))
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &SqliteRow,
    column: &'static str,
) -> Result<T, StorageError> {
    let raw: String = row.try_get(column).map_err(ser)?;
    serde_json::from_str(&raw).map_err(ser)
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn map_item_row(row: &SqliteRow) -> Result<Item, StorageError> {
    let id = ItemId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let set_id = SetId::new(row.try_get::<String, _>("set_id").map_err(ser)?).map_err(ser)?;

    ItemDraft {
        id,
        kanji: row.try_get("kanji").map_err(ser)?,
        readings: json_column(row, "readings")?,
        meanings: json_column(row, "meanings")?,
        set_id: Some(set_id),
        examples: json_column::<Vec<Example>>(row, "examples")?,
    }
    .validate()
    .map_err(ser)
}

pub(crate) fn map_set_row(row: &SqliteRow) -> Result<ItemSet, StorageError> {
    let id = SetId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let is_custom = row.try_get::<i64, _>("is_custom").map_err(ser)? != 0;
    ItemSet::new(id, title, is_custom).map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let item_id = ItemId::new(row.try_get::<String, _>("item_id").map_err(ser)?).map_err(ser)?;
    let last_reviewed = row
        .try_get::<Option<i64>, _>("last_reviewed_ms")
        .map_err(ser)?
        .map(|ms| millis_to_datetime("last_reviewed_ms", ms))
        .transpose()?;

    Ok(ProgressRecord {
        item_id,
        correct_count: u32_from_i64(
            "correct_count",
            row.try_get("correct_count").map_err(ser)?,
        )?,
        incorrect_count: u32_from_i64(
            "incorrect_count",
            row.try_get("incorrect_count").map_err(ser)?,
        )?,
        streak: u32_from_i64("streak", row.try_get("streak").map_err(ser)?)?,
        last_reviewed,
        next_review: millis_to_datetime(
            "next_review_ms",
            row.try_get("next_review_ms").map_err(ser)?,
        )?,
    })
}

pub(crate) fn map_stats_row(row: &SqliteRow) -> Result<UserStats, StorageError> {
    Ok(UserStats {
        total_answered: u64_from_i64(
            "total_answered",
            row.try_get("total_answered").map_err(ser)?,
        )?,
        correct_answers: u64_from_i64(
            "correct_answers",
            row.try_get("correct_answers").map_err(ser)?,
        )?,
        current_streak: u32_from_i64(
            "current_streak",
            row.try_get("current_streak").map_err(ser)?,
        )?,
        best_streak: u32_from_i64("best_streak", row.try_get("best_streak").map_err(ser)?)?,
    })
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<QuizResult, StorageError> {
    QuizResult::new(
        u32_from_i64("total", row.try_get("total").map_err(ser)?)?,
        u32_from_i64("correct", row.try_get("correct").map_err(ser)?)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row_with_id(row: &SqliteRow) -> Result<QuizResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(QuizResultRow::new(id, map_result_row(row)?))
}
