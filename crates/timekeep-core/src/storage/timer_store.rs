//! SQLite-backed timer store.
//!
//! The store owns persistence of [`TimerRecord`]s. It is an explicitly
//! constructed handle: open one per process (or per test) and pass it to
//! whatever drives the UI or the CLI.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::events::Event;
use crate::timer::{Priority, TimerDraft, TimerPatch, TimerRecord};

const SELECT_COLUMNS: &str = "id, title, person_name, priority, date, is_countdown,
    is_favourite, is_recurring, recurrence_interval, next_date, notification_id,
    reminder_notification_id, notification_scheduled_for, created_at, updated_at";

/// Sort order for [`TimerStore::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Oldest first.
    #[default]
    Created,
    /// Soonest effective date first.
    EffectiveDate,
    /// High priority first, then soonest effective date.
    Priority,
}

impl ListOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(ListOrder::Created),
            "date" | "effective" => Some(ListOrder::EffectiveDate),
            "priority" => Some(ListOrder::Priority),
            _ => None,
        }
    }
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

fn row_to_timer(row: &rusqlite::Row) -> rusqlite::Result<TimerRecord> {
    let priority: String = row.get(3)?;
    Ok(TimerRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        person_name: row.get(2)?,
        priority: Priority::parse(&priority).unwrap_or_default(),
        date: parse_ts(4, &row.get::<_, String>(4)?)?,
        is_countdown: row.get(5)?,
        is_favourite: row.get(6)?,
        is_recurring: row.get(7)?,
        recurrence_interval: row.get(8)?,
        next_date: parse_opt_ts(9, row.get(9)?)?,
        notification_id: row.get(10)?,
        reminder_notification_id: row.get(11)?,
        notification_scheduled_for: parse_opt_ts(12, row.get(12)?)?,
        created_at: parse_ts(13, &row.get::<_, String>(13)?)?,
        updated_at: parse_ts(14, &row.get::<_, String>(14)?)?,
    })
}

/// SQLite store for timers.
pub struct TimerStore {
    conn: Connection,
}

impl TimerStore {
    /// Open the store at `~/.config/timekeep/timekeep.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or the database cannot be
    /// opened, or the schema cannot be created.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("timekeep.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS timers (
                id                         TEXT PRIMARY KEY,
                title                      TEXT NOT NULL,
                person_name                TEXT NOT NULL DEFAULT '',
                priority                   TEXT NOT NULL DEFAULT 'normal',
                date                       TEXT NOT NULL,
                is_countdown               INTEGER NOT NULL DEFAULT 1,
                is_favourite               INTEGER NOT NULL DEFAULT 0,
                is_recurring               INTEGER NOT NULL DEFAULT 0,
                recurrence_interval        TEXT,
                next_date                  TEXT,
                notification_id            TEXT,
                reminder_notification_id   TEXT,
                notification_scheduled_for TEXT,
                created_at                 TEXT NOT NULL,
                updated_at                 TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_timers_created_at ON timers(created_at);
            CREATE INDEX IF NOT EXISTS idx_timers_is_favourite ON timers(is_favourite);",
        )
    }

    fn write(&self, record: &TimerRecord) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO timers (
                id, title, person_name, priority, date, is_countdown, is_favourite,
                is_recurring, recurrence_interval, next_date, notification_id,
                reminder_notification_id, notification_scheduled_for, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.id,
                record.title,
                record.person_name,
                record.priority.as_str(),
                record.date.to_rfc3339(),
                record.is_countdown,
                record.is_favourite,
                record.is_recurring,
                record.recurrence_interval,
                record.next_date.map(|dt| dt.to_rfc3339()),
                record.notification_id,
                record.reminder_notification_id,
                record.notification_scheduled_for.map(|dt| dt.to_rfc3339()),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn exists(&self, id: &str) -> rusqlite::Result<bool> {
        self.conn
            .query_row("SELECT 1 FROM timers WHERE id = ?1", params![id], |_| Ok(()))
            .optional()
            .map(|row| row.is_some())
    }

    /// Create a timer from a draft.
    ///
    /// # Errors
    /// Returns a validation error for a blank title or a bad interval, or a
    /// database error if the insert fails.
    pub fn create(&self, draft: TimerDraft, now: DateTime<Utc>) -> Result<Event> {
        let mut record = TimerRecord::from_draft(Uuid::new_v4().to_string(), draft, now);
        record.validate()?;
        record.refresh_next_date(now);
        self.write(&record)?;
        tracing::debug!(id = %record.id, title = %record.title, "timer created");
        Ok(Event::TimerCreated {
            id: record.id,
            at: now,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<TimerRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM timers WHERE id = ?1");
        let record = self
            .conn
            .query_row(&sql, params![id], row_to_timer)
            .optional()?;
        Ok(record)
    }

    /// Like [`TimerStore::get`] but a missing timer is an error.
    pub fn require(&self, id: &str) -> Result<TimerRecord> {
        self.get(id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// All timers in the requested order.
    pub fn list(&self, order: ListOrder, now: DateTime<Utc>) -> Result<Vec<TimerRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM timers ORDER BY created_at, rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut records = stmt
            .query_map([], row_to_timer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match order {
            ListOrder::Created => {}
            ListOrder::EffectiveDate => {
                records.sort_by_key(|r| r.effective_date(now));
            }
            ListOrder::Priority => {
                records.sort_by(|a, b| {
                    b.priority
                        .cmp(&a.priority)
                        .then_with(|| a.effective_date(now).cmp(&b.effective_date(now)))
                });
            }
        }
        Ok(records)
    }

    /// Favourite timers only, in the requested order.
    pub fn favourites(&self, order: ListOrder, now: DateTime<Utc>) -> Result<Vec<TimerRecord>> {
        let mut records = self.list(order, now)?;
        records.retain(|r| r.is_favourite);
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM timers", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Apply a partial edit.
    ///
    /// Edits that can move the effective date drop the notification
    /// bookkeeping so the next sync re-plans the alerts.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, or a validation error if the
    /// edited record is invalid (nothing is written in that case).
    pub fn update(&self, id: &str, patch: TimerPatch, now: DateTime<Utc>) -> Result<Event> {
        let mut record = self.require(id)?;
        record.apply(patch, now);
        record.validate()?;
        record.refresh_next_date(now);
        self.write(&record)?;
        tracing::debug!(id, "timer updated");
        Ok(Event::TimerUpdated {
            id: record.id,
            at: now,
        })
    }

    pub fn toggle_favourite(&self, id: &str, now: DateTime<Utc>) -> Result<Event> {
        let mut record = self.require(id)?;
        record.is_favourite = !record.is_favourite;
        record.updated_at = now;
        self.write(&record)?;
        Ok(Event::FavouriteToggled {
            id: record.id,
            is_favourite: record.is_favourite,
            at: now,
        })
    }

    pub fn delete(&self, id: &str, now: DateTime<Utc>) -> Result<Event> {
        let affected = self
            .conn
            .execute("DELETE FROM timers WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        tracing::debug!(id, "timer deleted");
        Ok(Event::TimerDeleted {
            id: id.to_string(),
            at: now,
        })
    }

    /// Delete every timer.
    pub fn clear(&self, now: DateTime<Utc>) -> Result<Event> {
        let count = self.conn.execute("DELETE FROM timers", [])?;
        tracing::debug!(count, "timers cleared");
        Ok(Event::TimersCleared { count, at: now })
    }

    /// Recompute the cached next occurrence of every timer.
    ///
    /// Returns one event per timer whose cache moved; calling it again with
    /// the same `now` returns nothing.
    pub fn refresh_next_dates(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for mut record in self.list(ListOrder::Created, now)? {
            if record.refresh_next_date(now) {
                self.write(&record)?;
                events.push(Event::NextDateRefreshed {
                    id: record.id,
                    next_date: record.next_date,
                    at: now,
                });
            }
        }
        Ok(events)
    }

    /// Persist the notification bookkeeping of `record` without touching
    /// any other field.
    pub fn save_notification_state(&self, record: &TimerRecord) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE timers
             SET notification_id = ?2,
                 reminder_notification_id = ?3,
                 notification_scheduled_for = ?4
             WHERE id = ?1",
            params![
                record.id,
                record.notification_id,
                record.reminder_notification_id,
                record.notification_scheduled_for.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        if affected == 0 {
            return Err(CoreError::NotFound(record.id.clone()));
        }
        Ok(())
    }

    /// All timers as a pretty-printed JSON array.
    pub fn export_json(&self, now: DateTime<Utc>) -> Result<String> {
        let records = self.list(ListOrder::Created, now)?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Import timers from a JSON array produced by [`TimerStore::export_json`].
    ///
    /// Invalid records are skipped. Records whose id already exists are
    /// skipped unless `overwrite` is set. Notification bookkeeping is
    /// dropped because alerts are local to the exporting device.
    ///
    /// # Errors
    /// Returns an error if the payload is not a JSON array of timers or a
    /// write fails; a failed write rolls back the whole import.
    pub fn import_json(&self, json: &str, overwrite: bool, now: DateTime<Utc>) -> Result<Event> {
        let records: Vec<TimerRecord> = serde_json::from_str(json)?;
        let tx = self.conn.unchecked_transaction()?;

        let mut imported = 0;
        let mut skipped = 0;
        for mut record in records {
            if let Err(e) = record.validate() {
                tracing::warn!(id = %record.id, error = %e, "skipping invalid timer on import");
                skipped += 1;
                continue;
            }
            if !overwrite && self.exists(&record.id)? {
                tracing::debug!(id = %record.id, "skipping existing timer on import");
                skipped += 1;
                continue;
            }
            record.clear_notification_state();
            record.refresh_next_date(now);
            self.write(&record)?;
            imported += 1;
        }

        tx.commit()?;
        Ok(Event::TimersImported {
            imported,
            skipped,
            at: now,
        })
    }
}
