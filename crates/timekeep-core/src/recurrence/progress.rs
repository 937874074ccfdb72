//! Cycle progress and the per-tick live status polled by the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::add_interval;
use super::duration::{decompose_duration, TimeParts};
use super::interval::{parse_interval, Interval};
use super::projection::{next_occurrence, Projection};
use crate::timer::TimerRecord;

/// Start and end of the cycle a recurring timer is currently in. The start
/// is one interval back from the target.
fn cycle_bounds(
    anchor: DateTime<Utc>,
    interval: Interval,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, Projection) {
    let projection = next_occurrence(anchor, Some(interval), now);
    let start = add_interval(projection.next_date, -i64::from(interval.count), interval.unit);
    (start, projection)
}

fn recurring_interval(timer: &TimerRecord) -> Option<Interval> {
    if !timer.is_recurring {
        return None;
    }
    timer.recurrence_interval.as_deref().and_then(parse_interval)
}

/// Percentage of the current cycle that has elapsed, in `[0, 100]`.
///
/// Count-up timers and one-shot countdowns have no cycle start and report 0.
pub fn progress_pct(timer: &TimerRecord, now: DateTime<Utc>) -> f64 {
    if !timer.is_countdown {
        return 0.0;
    }
    let Some(interval) = recurring_interval(timer) else {
        return 0.0;
    };

    let (start, projection) = cycle_bounds(timer.date, interval, now);
    let target = projection.next_date;

    if now < start {
        return 0.0;
    }
    if now > target || target <= start {
        return 100.0;
    }
    let total = (target - start).num_milliseconds() as f64;
    let done = (now - start).num_milliseconds() as f64;
    (100.0 * done / total).clamp(0.0, 100.0)
}

/// Everything a countdown chip needs for one render tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub effective_date: DateTime<Utc>,
    pub cycles_elapsed: u64,
    pub progress_pct: f64,
    /// Time left until `effective_date` (countdowns only).
    pub remaining: Option<TimeParts>,
    /// Time since `date` (count-up), or since a one-shot target passed.
    pub elapsed: Option<TimeParts>,
    /// True once a non-recurring countdown's target is at or before now.
    pub is_due: bool,
}

pub fn live_status(timer: &TimerRecord, now: DateTime<Utc>) -> LiveStatus {
    let projection = next_occurrence(timer.date, recurring_interval(timer), now);
    let effective_date = projection.next_date;
    let progress_pct = progress_pct(timer, now);

    if !timer.is_countdown {
        return LiveStatus {
            effective_date: timer.date,
            cycles_elapsed: 0,
            progress_pct,
            remaining: None,
            elapsed: Some(decompose_duration((now - timer.date).num_milliseconds())),
            is_due: false,
        };
    }

    let until = (effective_date - now).num_milliseconds();
    let is_due = until <= 0;
    LiveStatus {
        effective_date,
        cycles_elapsed: projection.cycles_elapsed,
        progress_pct,
        remaining: Some(decompose_duration(until)),
        elapsed: is_due.then(|| decompose_duration(-until)),
        is_due,
    }
}
