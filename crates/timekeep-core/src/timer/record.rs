//! The timer record and its create/edit payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::recurrence::{effective_date, parse_interval, Interval};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A countdown or count-up timer.
///
/// For recurring timers `date` is the anchor of the first occurrence. It only
/// changes through an explicit edit; projection never moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub person_name: String,
    #[serde(default)]
    pub priority: Priority,
    pub date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_countdown: bool,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_interval: Option<String>,
    /// Cached next occurrence. Always re-derivable from `date`, the interval and now.
    #[serde(default)]
    pub next_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notification_id: Option<String>,
    #[serde(default)]
    pub reminder_notification_id: Option<String>,
    #[serde(default)]
    pub notification_scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Replacement text for names hidden by privacy mode.
pub const MASK: &str = "••••";

fn mask(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        MASK.to_string()
    }
}

/// Fields supplied when creating a timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDraft {
    pub title: String,
    #[serde(default)]
    pub person_name: String,
    #[serde(default)]
    pub priority: Priority,
    pub date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_countdown: bool,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_interval: Option<String>,
}

impl TimerDraft {
    /// A one-shot countdown to `date`.
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            person_name: String::new(),
            priority: Priority::Normal,
            date,
            is_countdown: true,
            is_favourite: false,
            is_recurring: false,
            recurrence_interval: None,
        }
    }

    /// Make the draft recur every `interval`.
    pub fn every(mut self, interval: impl Into<String>) -> Self {
        self.is_recurring = true;
        self.recurrence_interval = Some(interval.into());
        self
    }
}

/// Partial edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerPatch {
    pub title: Option<String>,
    pub person_name: Option<String>,
    pub priority: Option<Priority>,
    pub date: Option<DateTime<Utc>>,
    pub is_countdown: Option<bool>,
    pub is_favourite: Option<bool>,
    pub is_recurring: Option<bool>,
    /// An empty string removes the interval.
    pub recurrence_interval: Option<String>,
}

impl TimerPatch {
    /// True when the edit can move the instant this timer counts toward.
    pub fn touches_schedule(&self) -> bool {
        self.date.is_some()
            || self.is_countdown.is_some()
            || self.is_recurring.is_some()
            || self.recurrence_interval.is_some()
    }
}

impl TimerRecord {
    /// Build a record without validating it. The store validates before it
    /// persists anything.
    pub fn from_draft(id: String, draft: TimerDraft, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id,
            title: draft.title,
            person_name: draft.person_name,
            priority: draft.priority,
            date: draft.date,
            is_countdown: draft.is_countdown,
            is_favourite: draft.is_favourite,
            is_recurring: draft.is_recurring,
            recurrence_interval: draft.recurrence_interval,
            next_date: None,
            notification_id: None,
            reminder_notification_id: None,
            notification_scheduled_for: None,
            created_at: now,
            updated_at: now,
        };
        record.refresh_next_date(now);
        record
    }

    /// Parsed interval, only for recurring timers with a valid interval string.
    pub fn interval(&self) -> Option<Interval> {
        if !self.is_recurring {
            return None;
        }
        self.recurrence_interval.as_deref().and_then(parse_interval)
    }

    pub fn effective_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        effective_date(self, now)
    }

    /// Recompute the cached `next_date`. Returns whether it changed.
    pub fn refresh_next_date(&mut self, now: DateTime<Utc>) -> bool {
        let next = self.interval().map(|_| effective_date(self, now));
        let changed = next != self.next_date;
        self.next_date = next;
        changed
    }

    /// Apply an edit. Validation happens afterwards via [`TimerRecord::validate`].
    pub fn apply(&mut self, patch: TimerPatch, now: DateTime<Utc>) {
        let reschedule = patch.touches_schedule();
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(person_name) = patch.person_name {
            self.person_name = person_name;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(is_countdown) = patch.is_countdown {
            self.is_countdown = is_countdown;
        }
        if let Some(is_favourite) = patch.is_favourite {
            self.is_favourite = is_favourite;
        }
        if let Some(is_recurring) = patch.is_recurring {
            self.is_recurring = is_recurring;
        }
        if let Some(interval) = patch.recurrence_interval {
            self.recurrence_interval = (!interval.trim().is_empty()).then_some(interval);
        }
        if reschedule {
            self.clear_notification_state();
        }
        self.updated_at = now;
        self.refresh_next_date(now);
    }

    /// Check the record and rewrite its interval in canonical form.
    ///
    /// A one-shot timer never fails on its interval: a leftover string that
    /// does not parse is dropped.
    ///
    /// # Errors
    /// Returns an error for a blank title, a recurring timer without an
    /// interval, or a recurring timer whose interval does not parse.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let raw = self
            .recurrence_interval
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if raw.is_empty() {
            self.recurrence_interval = None;
            if self.is_recurring {
                return Err(ValidationError::MissingInterval);
            }
            return Ok(());
        }
        match parse_interval(&raw) {
            Some(interval) => self.recurrence_interval = Some(interval.to_string()),
            None if self.is_recurring => return Err(ValidationError::InvalidInterval(raw)),
            None => {
                tracing::debug!(id = %self.id, interval = %raw, "dropping unparseable interval");
                self.recurrence_interval = None;
            }
        }
        Ok(())
    }

    /// Copy with display strings hidden, for privacy mode.
    pub fn masked(&self) -> Self {
        Self {
            title: mask(&self.title),
            person_name: mask(&self.person_name),
            ..self.clone()
        }
    }

    pub fn clear_notification_state(&mut self) {
        self.notification_id = None;
        self.reminder_notification_id = None;
        self.notification_scheduled_for = None;
    }
}
