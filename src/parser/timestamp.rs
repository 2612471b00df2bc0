//! Header timestamp normalization
//!
//! Timestamps arrive in loosely formatted text. Every non-digit is removed,
//! the remaining digits are cut to the longest accepted length they reach
//! (14, 12 or 8) and interpreted without a timezone. Anything that cannot be
//! interpreted becomes [`CanonicalTimestamp::Defaulted`] at the current
//! wall-clock time.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::constants::{MIN_TIMESTAMP_DIGITS, TIMESTAMP_FORMATS};
use crate::models::CanonicalTimestamp;

/// Current local wall-clock time without timezone
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Normalize a raw timestamp field using the local clock for fallbacks
pub fn normalize(raw: &str) -> CanonicalTimestamp {
    normalize_with_clock(raw, local_now)
}

/// Normalize a raw timestamp field, calling `now` only when falling back
pub fn normalize_with_clock<F>(raw: &str, now: F) -> CanonicalTimestamp
where
    F: FnOnce() -> NaiveDateTime,
{
    match interpret(raw) {
        Some(dt) => CanonicalTimestamp::Parsed(dt),
        None => {
            debug!("Timestamp '{}' not interpretable, defaulting to now", raw);
            CanonicalTimestamp::Defaulted {
                raw: raw.to_string(),
                at: now(),
            }
        }
    }
}

/// Interpret the digits of `raw`, or `None` when they do not form a
/// calendar-valid date/time
pub fn interpret(raw: &str) -> Option<NaiveDateTime> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_TIMESTAMP_DIGITS {
        return None;
    }

    let (length, format) = TIMESTAMP_FORMATS
        .iter()
        .find(|(length, _)| digits.len() >= *length)?;
    let retained = &digits[..*length];

    if *length == MIN_TIMESTAMP_DIGITS {
        NaiveDate::parse_from_str(retained, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    } else {
        // chrono reads second 60 as a leap second; treat it as out of range
        NaiveDateTime::parse_from_str(retained, format)
            .ok()
            .filter(|dt| dt.nanosecond() < 1_000_000_000)
    }
}
