//! Exam day countdown.

use chrono::NaiveDate;

/// Whole days from `today` until `exam`, or 0 once the exam date has passed.
pub fn days_until(exam: NaiveDate, today: NaiveDate) -> i64 {
    exam.signed_duration_since(today).num_days().max(0)
}
