//! Calendar arithmetic primitives.
//!
//! Seconds through weeks are fixed durations. Months and years walk the
//! calendar: the day of month is clamped to the last day of the target month
//! and the time of day is kept, so Jan 31 + 1 month is Feb 29 in 2024 and
//! Feb 28 in 2023. All results saturate at the representable range.

use chrono::{DateTime, Duration, Months, Utc};

use super::interval::Unit;

/// Add `count` units to `date`. Negative counts subtract.
pub fn add_interval(date: DateTime<Utc>, count: i64, unit: Unit) -> DateTime<Utc> {
    match unit.fixed_millis() {
        Some(unit_ms) => add_fixed(date, count, unit_ms),
        None => {
            let months = match unit {
                Unit::Year => count.checked_mul(12),
                _ => Some(count),
            };
            match months {
                Some(months) => add_months(date, months),
                None => saturate(count),
            }
        }
    }
}

fn add_fixed(date: DateTime<Utc>, count: i64, unit_ms: i64) -> DateTime<Utc> {
    count
        .checked_mul(unit_ms)
        .and_then(Duration::try_milliseconds)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or_else(|| saturate(count))
}

fn add_months(date: DateTime<Utc>, months: i64) -> DateTime<Utc> {
    let Ok(magnitude) = u32::try_from(months.unsigned_abs()) else {
        return saturate(months);
    };
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    };
    shifted.unwrap_or_else(|| saturate(months))
}

fn saturate(direction: i64) -> DateTime<Utc> {
    if direction >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    }
}
