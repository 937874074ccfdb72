pub mod config;
pub mod interval;
pub mod notify;
pub mod timer;

use chrono::{DateTime, Utc};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            format!("invalid date '{raw}': {e} (expected RFC 3339, e.g. 2024-06-01T09:00:00Z)")
        })
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
