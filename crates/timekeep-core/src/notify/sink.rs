use std::collections::BTreeMap;

use super::plan::Alert;
use crate::error::Result;

/// Boundary to whatever actually delivers local alerts.
///
/// Implementations hand back an opaque id for each scheduled alert; that id
/// is stored on the timer and passed to `cancel` when the plan changes.
pub trait AlertSink {
    fn schedule(&mut self, alert: &Alert) -> Result<String>;

    fn cancel(&mut self, alert_id: &str) -> Result<()>;
}

/// In-memory sink that keeps pending alerts keyed by id.
#[derive(Debug, Default)]
pub struct MemorySink {
    next_id: u64,
    pending: BTreeMap<String, Alert>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> impl Iterator<Item = (&str, &Alert)> {
        self.pending.iter().map(|(id, alert)| (id.as_str(), alert))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl AlertSink for MemorySink {
    fn schedule(&mut self, alert: &Alert) -> Result<String> {
        self.next_id += 1;
        let id = format!("alert-{}", self.next_id);
        self.pending.insert(id.clone(), alert.clone());
        Ok(id)
    }

    fn cancel(&mut self, alert_id: &str) -> Result<()> {
        // Cancelling an alert that already fired or never existed is fine.
        self.pending.remove(alert_id);
        Ok(())
    }
}
