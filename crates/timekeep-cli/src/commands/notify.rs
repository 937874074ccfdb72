use std::io::Write;

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use timekeep_core::notify::Alert;
use timekeep_core::timer::MASK;
use timekeep_core::{plan_notification, sync_store, AlertSink, Config, CoreError, TimerStore};
use uuid::Uuid;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show the alerts a timer would get right now
    Plan {
        /// Timer ID
        id: String,
    },
    /// Reconcile every timer's alerts and print what changed
    Sync,
}

/// Delivers alerts by writing one JSON line per action to stdout.
///
/// Stands in for a platform notification service; a scheduler process can
/// consume the lines.
struct StdoutSink<W: Write> {
    out: W,
    privacy_mode: bool,
}

impl<W: Write> StdoutSink<W> {
    fn emit(&mut self, line: serde_json::Value) -> timekeep_core::error::Result<()> {
        writeln!(self.out, "{line}").map_err(|e| CoreError::Notification(e.to_string()))
    }
}

impl<W: Write> AlertSink for StdoutSink<W> {
    fn schedule(&mut self, alert: &Alert) -> timekeep_core::error::Result<String> {
        let alert_id = Uuid::new_v4().to_string();
        let mut alert = alert.clone();
        if self.privacy_mode {
            alert.title = MASK.to_string();
        }
        self.emit(json!({ "action": "schedule", "alertId": alert_id, "alert": alert }))?;
        Ok(alert_id)
    }

    fn cancel(&mut self, alert_id: &str) -> timekeep_core::error::Result<()> {
        self.emit(json!({ "action": "cancel", "alertId": alert_id }))
    }
}

pub fn run(action: NotifyAction) -> CmdResult {
    let config = Config::load_or_default();
    let store = TimerStore::open()?;
    let now = Utc::now();

    match action {
        NotifyAction::Plan { id } => {
            let timer = store.require(&id)?;
            let mut plan = plan_notification(&timer, now, &config.notifications);
            if config.display.privacy_mode {
                if let Some(plan) = plan.as_mut() {
                    plan.due.title = MASK.to_string();
                    if let Some(reminder) = plan.reminder.as_mut() {
                        reminder.title = MASK.to_string();
                    }
                }
            }
            print_json(&plan)?;
        }
        NotifyAction::Sync => {
            let mut sink = StdoutSink {
                out: std::io::stdout().lock(),
                privacy_mode: config.display.privacy_mode,
            };
            let events = sync_store(&store, now, &config.notifications, &mut sink)?;
            tracing::info!(changes = events.len(), "notifications synced");
        }
    }
    Ok(())
}
