//! Integration tests for the timer store and notification syncing.

use chrono::{DateTime, TimeZone, Utc};
use timekeep_core::storage::NotificationsConfig;
use timekeep_core::{
    sync_store, CoreError, Event, ListOrder, MemorySink, Priority, TimerDraft, TimerPatch,
    TimerStore, ValidationError,
};

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn created_id(event: Event) -> String {
    match event {
        Event::TimerCreated { id, .. } => id,
        other => panic!("expected TimerCreated, got {other:?}"),
    }
}

#[test]
fn test_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timekeep.db");
    let now = utc(2024, 1, 1, 0);

    let id = {
        let store = TimerStore::open_at(&path).unwrap();
        let mut draft = TimerDraft::new("Anniversary", utc(2020, 6, 14, 18)).every("1 Years");
        draft.person_name = "Robin".into();
        draft.priority = Priority::High;
        created_id(store.create(draft, now).unwrap())
    };

    let store = TimerStore::open_at(&path).unwrap();
    let record = store.require(&id).unwrap();
    assert_eq!(record.person_name, "Robin");
    assert_eq!(record.priority, Priority::High);
    assert_eq!(record.recurrence_interval.as_deref(), Some("1 year"));
    assert_eq!(record.date, utc(2020, 6, 14, 18));
    assert_eq!(record.next_date, Some(utc(2024, 6, 14, 18)));
}

#[test]
fn test_edit_interval_recomputes_next_date() {
    let store = TimerStore::open_memory().unwrap();
    let now = utc(2024, 1, 10, 0);
    let id = created_id(
        store
            .create(TimerDraft::new("Backup", utc(2024, 1, 1, 0)).every("1 day"), now)
            .unwrap(),
    );

    let patch = TimerPatch {
        recurrence_interval: Some("1 week".into()),
        ..TimerPatch::default()
    };
    store.update(&id, patch, now).unwrap();

    let record = store.require(&id).unwrap();
    assert_eq!(record.next_date, Some(utc(2024, 1, 15, 0)));
    assert_eq!(record.date, utc(2024, 1, 1, 0));
}

#[test]
fn test_edit_rejects_recurring_without_interval() {
    let store = TimerStore::open_memory().unwrap();
    let now = utc(2024, 1, 1, 0);
    let id = created_id(store.create(TimerDraft::new("Plain", now), now).unwrap());

    let patch = TimerPatch {
        is_recurring: Some(true),
        ..TimerPatch::default()
    };
    let err = store.update(&id, patch, now).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::MissingInterval)
    ));
}

#[test]
fn test_export_then_import_into_fresh_store() {
    let source = TimerStore::open_memory().unwrap();
    let now = utc(2024, 1, 1, 0);
    source
        .create(TimerDraft::new("A", utc(2024, 2, 1, 0)), now)
        .unwrap();
    source
        .create(TimerDraft::new("B", utc(2023, 12, 1, 0)).every("2 weeks"), now)
        .unwrap();

    let json = source.export_json(now).unwrap();
    assert!(json.contains("\"recurrenceInterval\": \"2 weeks\""));

    let target = TimerStore::open_memory().unwrap();
    let event = target.import_json(&json, false, now).unwrap();
    assert!(matches!(
        event,
        Event::TimersImported {
            imported: 2,
            skipped: 0,
            ..
        }
    ));

    // Importing again without overwrite skips the existing ids.
    let again = target.import_json(&json, false, now).unwrap();
    assert!(matches!(
        again,
        Event::TimersImported {
            imported: 0,
            skipped: 2,
            ..
        }
    ));
    assert_eq!(target.count().unwrap(), 2);
}

#[test]
fn test_import_skips_invalid_records() {
    let store = TimerStore::open_memory().unwrap();
    let json = r#"[
        {"id": "ok", "title": "Fine", "date": "2024-05-01T00:00:00Z",
         "isRecurring": true, "recurrenceInterval": "3 Days",
         "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"},
        {"id": "bad", "title": "Broken", "date": "2024-05-01T00:00:00Z",
         "isRecurring": true, "recurrenceInterval": "every tuesday",
         "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}
    ]"#;

    let event = store.import_json(json, false, utc(2024, 1, 1, 0)).unwrap();
    assert!(matches!(
        event,
        Event::TimersImported {
            imported: 1,
            skipped: 1,
            ..
        }
    ));
    let record = store.require("ok").unwrap();
    assert_eq!(record.recurrence_interval.as_deref(), Some("3 days"));
    assert!(record.is_countdown);
}

#[test]
fn test_import_drops_stray_interval_on_one_shot_timer() {
    let store = TimerStore::open_memory().unwrap();
    let json = r#"[
        {"id": "once", "title": "Exam", "date": "2024-05-01T00:00:00Z",
         "isRecurring": false, "recurrenceInterval": "every tuesday",
         "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}
    ]"#;

    let event = store.import_json(json, false, utc(2024, 1, 1, 0)).unwrap();
    assert!(matches!(
        event,
        Event::TimersImported {
            imported: 1,
            skipped: 0,
            ..
        }
    ));
    let record = store.require("once").unwrap();
    assert!(!record.is_recurring);
    assert_eq!(record.recurrence_interval, None);
}

#[test]
fn test_import_rejects_non_array_payload() {
    let store = TimerStore::open_memory().unwrap();
    assert!(matches!(
        store.import_json("{\"id\": 1}", false, utc(2024, 1, 1, 0)),
        Err(CoreError::Json(_))
    ));
}

#[test]
fn test_sync_store_persists_alert_bookkeeping() {
    let store = TimerStore::open_memory().unwrap();
    let now = utc(2024, 1, 1, 0);
    let id = created_id(
        store
            .create(TimerDraft::new("Call", utc(2024, 1, 1, 12)), now)
            .unwrap(),
    );
    let passed = created_id(
        store
            .create(TimerDraft::new("Old", utc(2023, 1, 1, 0)), now)
            .unwrap(),
    );

    let mut sink = MemorySink::new();
    let cfg = NotificationsConfig::default();
    let events = sync_store(&store, now, &cfg, &mut sink).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(sink.len(), 2);

    let record = store.require(&id).unwrap();
    assert_eq!(record.notification_scheduled_for, Some(utc(2024, 1, 1, 12)));
    assert!(record.notification_id.is_some());
    assert!(record.reminder_notification_id.is_some());
    assert!(store.require(&passed).unwrap().notification_id.is_none());

    // Nothing changed, nothing to do.
    assert!(sync_store(&store, now, &cfg, &mut sink).unwrap().is_empty());
}

#[test]
fn test_rescheduling_edit_forces_resync() {
    let store = TimerStore::open_memory().unwrap();
    let now = utc(2024, 1, 1, 0);
    let id = created_id(
        store
            .create(TimerDraft::new("Call", utc(2024, 1, 1, 12)), now)
            .unwrap(),
    );
    let cfg = NotificationsConfig {
        enabled: true,
        reminder_lead_minutes: 0,
    };
    let mut sink = MemorySink::new();
    sync_store(&store, now, &cfg, &mut sink).unwrap();

    store
        .update(
            &id,
            TimerPatch {
                date: Some(utc(2024, 1, 2, 12)),
                ..TimerPatch::default()
            },
            now,
        )
        .unwrap();
    assert!(store.require(&id).unwrap().notification_id.is_none());

    let events = sync_store(&store, now, &cfg, &mut sink).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        store.require(&id).unwrap().notification_scheduled_for,
        Some(utc(2024, 1, 2, 12))
    );
}

#[test]
fn test_list_by_effective_date_uses_projection() {
    let store = TimerStore::open_memory().unwrap();
    let created = utc(2024, 1, 1, 0);
    store
        .create(TimerDraft::new("monthly", utc(2024, 1, 1, 0)).every("1 month"), created)
        .unwrap();
    store
        .create(TimerDraft::new("one-shot", utc(2024, 1, 20, 0)), created)
        .unwrap();

    let now = utc(2024, 1, 10, 0);
    let titles: Vec<_> = store
        .list(ListOrder::EffectiveDate, now)
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, ["one-shot", "monthly"]);
}
