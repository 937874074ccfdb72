//! Next-occurrence projection.
//!
//! Occurrences of a recurring timer are reached by repeatedly adding the
//! interval to the previous one, starting at the anchor. The projection is
//! the first occurrence strictly after `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::add_interval;
use super::interval::{parse_interval, Interval};
use crate::timer::TimerRecord;

/// Upper bound on calendar steps walked by a single projection.
pub const MAX_PROJECTION_ITERATIONS: u32 = 10_000;

/// Result of projecting an anchor forward past `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub next_date: DateTime<Utc>,
    /// Completed cycles before `next_date`; the upcoming one is not counted.
    pub cycles_elapsed: u64,
    /// Set when the iteration cap stopped the walk before passing `now`.
    #[serde(default)]
    pub capped: bool,
}

impl Projection {
    fn at_anchor(anchor: DateTime<Utc>) -> Self {
        Self {
            next_date: anchor,
            cycles_elapsed: 0,
            capped: false,
        }
    }
}

/// Project `anchor` to the first occurrence strictly after `now`.
///
/// Without an interval, or before the anchor is reached, the anchor itself is
/// the next date.
pub fn next_occurrence(
    anchor: DateTime<Utc>,
    interval: Option<Interval>,
    now: DateTime<Utc>,
) -> Projection {
    let Some(interval) = interval else {
        return Projection::at_anchor(anchor);
    };
    if now < anchor {
        return Projection::at_anchor(anchor);
    }

    match interval.unit.fixed_millis() {
        Some(unit_ms) => project_fixed(anchor, interval, unit_ms, now),
        None => project_calendar(anchor, interval, now),
    }
}

/// Closed form for fixed-length units, equal to the chained walk:
/// `floor(elapsed / step)` cycles have completed and the next occurrence
/// follows them.
fn project_fixed(
    anchor: DateTime<Utc>,
    interval: Interval,
    unit_ms: i64,
    now: DateTime<Utc>,
) -> Projection {
    let step_ms = unit_ms * i64::from(interval.count);
    let elapsed_ms = (now - anchor).num_milliseconds();
    let completed = elapsed_ms / step_ms;

    Projection {
        next_date: add_interval(
            anchor,
            (completed + 1).saturating_mul(i64::from(interval.count)),
            interval.unit,
        ),
        cycles_elapsed: u64::try_from(completed).unwrap_or(0),
        capped: false,
    }
}

/// Chained walk for calendar units: each step adds the interval to the
/// previous occurrence, so a clamped day of month carries forward.
fn project_calendar(anchor: DateTime<Utc>, interval: Interval, now: DateTime<Utc>) -> Projection {
    let count = i64::from(interval.count);
    let mut cursor = anchor;
    let mut steps: u32 = 0;

    while cursor <= now {
        if steps == MAX_PROJECTION_ITERATIONS {
            tracing::warn!(
                %anchor,
                %interval,
                %now,
                "recurrence projection hit the iteration cap; returning last computed occurrence"
            );
            return Projection {
                next_date: cursor,
                cycles_elapsed: u64::from(steps - 1),
                capped: true,
            };
        }
        let next = add_interval(cursor, count, interval.unit);
        if next <= cursor {
            // Saturated at the end of the representable range.
            tracing::warn!(%anchor, %interval, "recurrence projection cannot advance further");
            return Projection {
                next_date: cursor,
                cycles_elapsed: u64::from(steps.saturating_sub(1)),
                capped: true,
            };
        }
        cursor = next;
        steps += 1;
    }

    Projection {
        next_date: cursor,
        cycles_elapsed: u64::from(steps - 1),
        capped: false,
    }
}

/// The instant a timer is currently counting toward.
///
/// Non-recurring timers, recurring timers whose anchor is still ahead, and
/// recurring timers with an unparseable interval all count toward `date`.
pub fn effective_date(timer: &TimerRecord, now: DateTime<Utc>) -> DateTime<Utc> {
    if !timer.is_recurring || timer.date > now {
        return timer.date;
    }
    let interval = timer.recurrence_interval.as_deref().and_then(parse_interval);
    next_occurrence(timer.date, interval, now).next_date
}
