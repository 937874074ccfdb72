//! Deciding when a timer's alerts should fire.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::AlertKind;
use crate::recurrence::effective_date;
use crate::storage::NotificationsConfig;
use crate::timer::TimerRecord;

/// A single local alert to hand to the delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub timer_id: String,
    pub kind: AlertKind,
    pub title: String,
    pub fire_at: DateTime<Utc>,
    /// Whole seconds from planning time until `fire_at`, rounded up. Always >= 1.
    pub fire_in_secs: i64,
}

/// The alerts a timer needs right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPlan {
    pub due: Alert,
    pub reminder: Option<Alert>,
}

impl NotificationPlan {
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        std::iter::once(&self.due).chain(self.reminder.as_ref())
    }
}

fn seconds_until(fire_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (fire_at - now).num_milliseconds();
    (ms + 999) / 1000
}

fn alert(
    timer: &TimerRecord,
    kind: AlertKind,
    fire_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Alert {
    Alert {
        timer_id: timer.id.clone(),
        kind,
        title: timer.title.clone(),
        fire_at,
        fire_in_secs: seconds_until(fire_at, now),
    }
}

/// Plan the alerts for `timer` as of `now`.
///
/// Returns `None` when notifications are disabled, the timer counts up, or
/// its effective date is not strictly in the future (it already fired).
pub fn plan_notification(
    timer: &TimerRecord,
    now: DateTime<Utc>,
    cfg: &NotificationsConfig,
) -> Option<NotificationPlan> {
    if !cfg.enabled || !timer.is_countdown {
        return None;
    }
    let fire_at = effective_date(timer, now);
    if fire_at <= now {
        return None;
    }

    let reminder = Duration::try_minutes(i64::from(cfg.reminder_lead_minutes))
        .filter(|lead| !lead.is_zero())
        .and_then(|lead| fire_at.checked_sub_signed(lead))
        .filter(|at| *at > now)
        .map(|at| alert(timer, AlertKind::Reminder, at, now));

    Some(NotificationPlan {
        due: alert(timer, AlertKind::Due, fire_at, now),
        reminder,
    })
}
