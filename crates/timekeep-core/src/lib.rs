//! # Timekeep Core Library
//!
//! Core logic for Timekeep, a countdown / count-up timer and reminder app.
//! The CLI binary is a thin front end over this crate; any GUI shell would be
//! another.
//!
//! ## Architecture
//!
//! - **Recurrence engine**: pure calendar arithmetic that projects a timer's
//!   anchor date forward to its next occurrence and derives cycle progress and
//!   display countdowns. Every function takes an explicit `now`.
//! - **Storage**: SQLite-backed timer store and TOML-based configuration
//! - **Notifications**: decides when alerts fire and keeps each timer's alert
//!   bookkeeping in sync through an [`AlertSink`]
//!
//! ## Key Components
//!
//! - [`next_occurrence`], [`effective_date`], [`progress_pct`],
//!   [`decompose_duration`]: recurrence engine
//! - [`TimerRecord`]: the persisted timer
//! - [`TimerStore`]: timer persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod recurrence;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{AlertKind, Event};
pub use notify::{plan_notification, sync_notifications, sync_store, AlertSink, MemorySink};
pub use recurrence::{
    add_interval, decompose_duration, effective_date, live_status, next_occurrence,
    parse_interval, progress_pct, Interval, LiveStatus, Projection, TimeParts, Unit,
};
pub use storage::{Config, ListOrder, TimerStore};
pub use timer::{Priority, TimerDraft, TimerPatch, TimerRecord};
