//! Recurrence engine.
//!
//! Pure calendar arithmetic over a timer's anchor date, its recurrence
//! interval and an explicit `now`. Nothing here reads the clock, touches
//! storage or returns an error: malformed intervals behave as "not
//! recurring", negative durations clamp to zero and runaway projections are
//! capped at [`MAX_PROJECTION_ITERATIONS`].

mod calendar;
mod duration;
mod interval;
mod progress;
mod projection;

pub use calendar::add_interval;
pub use duration::{decompose_duration, TimeParts};
pub use interval::{parse_interval, Interval, Unit};
pub use progress::{live_status, progress_pct, LiveStatus};
pub use projection::{effective_date, next_occurrence, Projection, MAX_PROJECTION_ITERATIONS};
