//! Notification scheduling decisions.
//!
//! The planner decides *when* a timer should alert; an [`AlertSink`] does the
//! delivery. `sync_*` keeps a timer's bookkeeping fields (`notificationId`,
//! `reminderNotificationId`, `notificationScheduledFor`) in step with the plan.

mod plan;
mod sink;

pub use plan::{plan_notification, Alert, NotificationPlan};
pub use sink::{AlertSink, MemorySink};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::events::{AlertKind, Event};
use crate::storage::{ListOrder, NotificationsConfig, TimerStore};
use crate::timer::TimerRecord;

/// Bring one timer's scheduled alerts in line with its current plan.
///
/// Does nothing if the alerts already target the planned fire time.
/// Otherwise stale alerts are cancelled and fresh ones scheduled. The caller
/// persists the updated bookkeeping.
///
/// Bookkeeping is updated after every sink call, so on error `timer` still
/// names each alert that is live in the sink and must be persisted too.
///
/// # Errors
/// Returns an error if the sink fails to cancel or schedule.
pub fn sync_notifications(
    timer: &mut TimerRecord,
    now: DateTime<Utc>,
    cfg: &NotificationsConfig,
    sink: &mut dyn AlertSink,
) -> Result<Vec<Event>> {
    let plan = plan_notification(timer, now, cfg);

    let up_to_date = match &plan {
        Some(plan) => {
            timer.notification_id.is_some()
                && timer.notification_scheduled_for == Some(plan.due.fire_at)
        }
        None => timer.notification_id.is_none() && timer.reminder_notification_id.is_none(),
    };
    if up_to_date {
        return Ok(Vec::new());
    }

    let mut events = Vec::new();
    timer.notification_scheduled_for = None;
    for slot in [&mut timer.notification_id, &mut timer.reminder_notification_id] {
        let Some(alert_id) = slot.clone() else {
            continue;
        };
        sink.cancel(&alert_id)?;
        *slot = None;
        events.push(Event::AlertCancelled {
            timer_id: timer.id.clone(),
            alert_id,
            at: now,
        });
    }

    let Some(plan) = plan else {
        return Ok(events);
    };

    for alert in plan.alerts() {
        let alert_id = sink.schedule(alert)?;
        tracing::debug!(
            timer_id = %timer.id,
            %alert_id,
            kind = ?alert.kind,
            fire_at = %alert.fire_at,
            "alert scheduled"
        );
        match alert.kind {
            AlertKind::Due => timer.notification_id = Some(alert_id.clone()),
            AlertKind::Reminder => {
                timer.reminder_notification_id = Some(alert_id.clone());
            }
        }
        events.push(Event::AlertScheduled {
            timer_id: timer.id.clone(),
            alert_id,
            kind: alert.kind,
            fire_at: alert.fire_at,
            at: now,
        });
    }
    timer.notification_scheduled_for = Some(plan.due.fire_at);
    Ok(events)
}

/// Sync every timer in the store and persist the resulting bookkeeping.
///
/// When the sink fails partway through a timer, whatever it already
/// scheduled or cancelled is persisted before the error is returned.
///
/// # Errors
/// Returns an error if the store or the sink fails.
pub fn sync_store(
    store: &TimerStore,
    now: DateTime<Utc>,
    cfg: &NotificationsConfig,
    sink: &mut dyn AlertSink,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for mut timer in store.list(ListOrder::Created, now)? {
        match sync_notifications(&mut timer, now, cfg, sink) {
            Ok(changed) => {
                if !changed.is_empty() {
                    store.save_notification_state(&timer)?;
                    events.extend(changed);
                }
            }
            Err(e) => {
                store.save_notification_state(&timer)?;
                return Err(e);
            }
        }
    }
    Ok(events)
}
