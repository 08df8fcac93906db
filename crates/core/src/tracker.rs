//! Progress tracking: apply one answer to an item's mastery record.
//!
//! Correct answers back off exponentially (1, 2, 4, 8, … days) with the
//! streak; an incorrect answer resets the streak and makes the item due
//! immediately.

use chrono::{DateTime, Duration, Utc};

use crate::model::{ItemId, ProgressRecord};

//
// ─── INTERVALS ─────────────────────────────────────────────────────────────────
//

/// Days until the next review after `streak` consecutive correct answers.
///
/// `2^max(0, streak - 1)`, saturating at `u64::MAX` for absurd streaks.
///
/// ```
/// # use quiz_core::tracker::review_interval_days;
/// assert_eq!(review_interval_days(1), 1);
/// assert_eq!(review_interval_days(4), 8);
/// ```
#[must_use]
pub fn review_interval_days(streak: u32) -> u64 {
    1_u64
        .checked_shl(streak.saturating_sub(1))
        .unwrap_or(u64::MAX)
}

/// Timestamp at which an item with the given streak becomes due again.
///
/// Intervals have no cap; past chrono's range the result pins to the largest
/// representable instant, which is never reached.
#[must_use]
pub fn next_review_at(streak: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    i64::try_from(review_interval_days(streak))
        .ok()
        .and_then(Duration::try_days)
        .and_then(|interval| now.checked_add_signed(interval))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Apply one answer and return the updated record.
///
/// `existing` is the stored record for `item_id`, or `None` if the item was
/// never answered. The input is not modified; persisting the returned record is
/// the caller's job.
///
/// ```
/// # use quiz_core::model::ItemId;
/// # use quiz_core::tracker::record_answer;
/// let id = ItemId::new("n5-1").unwrap();
/// let now = chrono::Utc::now();
///
/// let first = record_answer(None, &id, true, now);
/// assert_eq!(first.streak, 1);
///
/// let second = record_answer(Some(&first), &id, false, now);
/// assert_eq!(second.streak, 0);
/// assert_eq!(second.next_review, now);
/// ```
#[must_use]
pub fn record_answer(
    existing: Option<&ProgressRecord>,
    item_id: &ItemId,
    is_correct: bool,
    now: DateTime<Utc>,
) -> ProgressRecord {
    let mut record = existing
        .cloned()
        .unwrap_or_else(|| ProgressRecord::new(item_id.clone()));
    debug_assert_eq!(&record.item_id, item_id);

    record.last_reviewed = Some(now);

    if is_correct {
        record.correct_count = record.correct_count.saturating_add(1);
        record.streak = record.streak.saturating_add(1);
        record.next_review = next_review_at(record.streak, now);
    } else {
        record.incorrect_count = record.incorrect_count.saturating_add(1);
        record.streak = 0;
        record.next_review = now;
    }

    record
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn id() -> ItemId {
        ItemId::new("n5-001").unwrap()
    }

    #[test]
    fn first_correct_answer_schedules_one_day_out() {
        let t = fixed_now();
        let record = record_answer(None, &id(), true, t);

        assert_eq!(
            record,
            ProgressRecord {
                item_id: id(),
                correct_count: 1,
                incorrect_count: 0,
                streak: 1,
                last_reviewed: Some(t),
                next_review: t + Duration::days(1),
            }
        );
    }

    #[test]
    fn incorrect_after_correct_resets_and_is_due_now() {
        let t = fixed_now();
        let first = record_answer(None, &id(), true, t);
        let later = t + Duration::days(1);
        let second = record_answer(Some(&first), &id(), false, later);

        assert_eq!(
            second,
            ProgressRecord {
                item_id: id(),
                correct_count: 1,
                incorrect_count: 1,
                streak: 0,
                last_reviewed: Some(later),
                next_review: later,
            }
        );
    }

    #[test]
    fn first_incorrect_answer_creates_failed_record() {
        let t = fixed_now();
        let record = record_answer(None, &id(), false, t);
        assert_eq!(record.correct_count, 0);
        assert_eq!(record.incorrect_count, 1);
        assert_eq!(record.streak, 0);
        assert!(record.is_recently_failed());
        assert!(record.is_due(t));
    }

    #[test]
    fn consecutive_correct_answers_double_the_interval() {
        let t = fixed_now();
        let mut record: Option<ProgressRecord> = None;
        let mut previous_next = None;

        for (i, expected_days) in [1_i64, 2, 4, 8, 16, 32].into_iter().enumerate() {
            let updated = record_answer(record.as_ref(), &id(), true, t);
            assert_eq!(updated.streak as usize, i + 1);
            assert_eq!(updated.next_review - t, Duration::days(expected_days));
            if let Some(prev) = previous_next {
                assert!(updated.next_review > prev);
            }
            previous_next = Some(updated.next_review);
            record = Some(updated);
        }
    }

    #[test]
    fn incorrect_resets_any_streak() {
        let t = fixed_now();
        let mut record = ProgressRecord::new(id());
        record.correct_count = 40;
        record.streak = 12;
        record.next_review = t + Duration::days(2048);

        let updated = record_answer(Some(&record), &id(), false, t);
        assert_eq!(updated.streak, 0);
        assert_eq!(updated.next_review, t);
        assert_eq!(updated.correct_count, 40);
    }

    #[test]
    fn counters_are_conserved_over_mixed_answers() {
        let t = fixed_now();
        let answers = [true, false, true, true, false, false, true, true, true, false];
        let mut record: Option<ProgressRecord> = None;
        for (step, correct) in answers.iter().enumerate() {
            let now = t + Duration::hours(step as i64);
            record = Some(record_answer(record.as_ref(), &id(), *correct, now));
        }
        let record = record.unwrap();

        let c = answers.iter().filter(|a| **a).count() as u32;
        let i = answers.len() as u32 - c;
        assert_eq!(record.correct_count, c);
        assert_eq!(record.incorrect_count, i);
        assert_eq!(record.total_answers(), answers.len() as u64);
        assert!(record.streak <= record.correct_count);
        assert_eq!(record.streak, 0);
    }

    #[test]
    fn input_record_is_left_untouched() {
        let t = fixed_now();
        let original = record_answer(None, &id(), true, t);
        let snapshot = original.clone();
        let _ = record_answer(Some(&original), &id(), false, t);
        assert_eq!(original, snapshot);
    }

    #[test]
    fn huge_streaks_saturate_instead_of_overflowing() {
        assert_eq!(review_interval_days(0), 1);
        assert_eq!(review_interval_days(64), 1_u64 << 63);
        assert_eq!(review_interval_days(65), u64::MAX);
        assert_eq!(next_review_at(200, fixed_now()), DateTime::<Utc>::MAX_UTC);

        let mut record = ProgressRecord::new(id());
        record.correct_count = u32::MAX;
        record.streak = u32::MAX;
        let updated = record_answer(Some(&record), &id(), true, fixed_now());
        assert_eq!(updated.correct_count, u32::MAX);
        assert_eq!(updated.next_review, DateTime::<Utc>::MAX_UTC);
    }
}
