use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use timekeep_core::{next_occurrence, parse_interval, ValidationError};

use super::{parse_date, print_json, CmdResult};

#[derive(Subcommand)]
pub enum IntervalAction {
    /// Parse an interval such as "2 weeks" and print its canonical form
    Parse {
        /// Interval text
        text: String,
    },
    /// Project the next occurrence of an anchor date
    Next {
        /// Anchor date (RFC 3339)
        anchor: String,
        /// Interval text
        text: String,
        /// Evaluate as of this instant instead of the current time (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsedInterval {
    count: u32,
    unit: &'static str,
    canonical: String,
}

pub fn run(action: IntervalAction) -> CmdResult {
    match action {
        IntervalAction::Parse { text } => {
            let interval = parse_interval(&text)
                .ok_or_else(|| ValidationError::InvalidInterval(text.clone()))?;
            print_json(&ParsedInterval {
                count: interval.count,
                unit: interval.unit.as_str(),
                canonical: interval.to_string(),
            })?;
        }
        IntervalAction::Next { anchor, text, now } => {
            let anchor = parse_date(&anchor)?;
            let now = match now {
                Some(raw) => parse_date(&raw)?,
                None => Utc::now(),
            };
            let interval = parse_interval(&text)
                .ok_or_else(|| ValidationError::InvalidInterval(text.clone()))?;
            print_json(&next_occurrence(anchor, Some(interval), now))?;
        }
    }
    Ok(())
}
