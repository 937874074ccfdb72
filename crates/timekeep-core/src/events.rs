use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of alert scheduled for a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Fires at the effective date.
    Due,
    /// Fires a configured lead time before the effective date.
    Reminder,
}

/// Every state change in the store or the notification planner produces an Event.
/// The CLI prints them; a GUI shell would forward them to its views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    TimerCreated {
        id: String,
        at: DateTime<Utc>,
    },
    TimerUpdated {
        id: String,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    /// Bulk clear of every timer.
    TimersCleared {
        count: usize,
        at: DateTime<Utc>,
    },
    TimersImported {
        imported: usize,
        skipped: usize,
        at: DateTime<Utc>,
    },
    FavouriteToggled {
        id: String,
        is_favourite: bool,
        at: DateTime<Utc>,
    },
    /// The cached next occurrence of a recurring timer moved.
    NextDateRefreshed {
        id: String,
        next_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    AlertScheduled {
        timer_id: String,
        alert_id: String,
        kind: AlertKind,
        fire_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    AlertCancelled {
        timer_id: String,
        alert_id: String,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn events_are_tagged_by_type() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = Event::AlertScheduled {
            timer_id: "t".into(),
            alert_id: "a".into(),
            kind: AlertKind::Reminder,
            fire_at: at,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AlertScheduled");
        assert_eq!(json["kind"], "reminder");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
