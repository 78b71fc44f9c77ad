//! Time values and their bridge to chrono.
//!
//! A time value is a count of milliseconds since 1970-01-01T00:00:00Z held in
//! an `f64`, with `NaN` standing for an invalid date. Calendar work happens on
//! chrono's `NaiveDateTime`; these helpers convert in and out.

use chrono::{DateTime, NaiveDateTime, Utc};

pub const MS_PER_SECOND: f64 = 1000.0;
pub const MS_PER_MINUTE: f64 = 60_000.0;
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Largest magnitude a time value may have (±100 000 000 days).
pub const MAX_TIME: f64 = 8.64e15;

/// Truncates to whole milliseconds; non-finite or out-of-range values become
/// `NaN`.
pub fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return f64::NAN;
    }
    // + 0.0 turns -0 into 0
    t.trunc() + 0.0
}

pub fn now_ms() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// The UTC wall clock of `t`, or `None` when `t` is invalid or beyond
/// chrono's calendar (about ±262 000 years).
pub fn to_naive(t: f64) -> Option<NaiveDateTime> {
    if !t.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(t as i64).map(|dt| dt.naive_utc())
}

/// Reads a wall clock as UTC.
pub fn from_naive(naive: &NaiveDateTime) -> f64 {
    naive.and_utc().timestamp_millis() as f64
}
