//! Timer management commands.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use timekeep_core::{
    live_status, Config, CoreError, ListOrder, LiveStatus, Priority, TimerDraft, TimerPatch,
    TimerRecord, TimerStore,
};

use super::{parse_date, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a timer
    Add {
        /// Timer title
        title: String,
        /// Target (or anchor) date as RFC 3339
        #[arg(long)]
        date: String,
        /// Person the timer is about
        #[arg(long)]
        person: Option<String>,
        /// low, normal or high
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Count up from the date instead of down to it
        #[arg(long)]
        count_up: bool,
        /// Recurrence interval, e.g. "2 weeks"
        #[arg(long)]
        every: Option<String>,
        /// Mark as favourite
        #[arg(long)]
        favourite: bool,
    },
    /// Edit a timer; only the given fields change
    Edit {
        /// Timer ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        person: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Switch between countdown (true) and count-up (false)
        #[arg(long)]
        countdown: Option<bool>,
        /// New recurrence interval; makes the timer recurring
        #[arg(long, conflicts_with = "once")]
        every: Option<String>,
        /// Stop recurring
        #[arg(long)]
        once: bool,
    },
    /// Delete a timer
    Delete {
        /// Timer ID
        id: String,
    },
    /// Delete every timer
    Clear,
    /// Toggle a timer's favourite flag
    Favourite {
        /// Timer ID
        id: String,
    },
    /// List timers with their live status
    List {
        /// created, date or priority
        #[arg(long, default_value = "created", value_parser = parse_order)]
        order: ListOrder,
        /// Only favourites
        #[arg(long)]
        favourites: bool,
    },
    /// Show one timer with its live status
    Show {
        /// Timer ID
        id: String,
    },
    /// Recompute cached next dates
    Refresh,
    /// Print all timers as a JSON array
    Export,
    /// Import timers from a JSON file produced by `export`
    Import {
        /// Path to the JSON file
        file: PathBuf,
        /// Replace timers whose id already exists
        #[arg(long)]
        overwrite: bool,
    },
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    Priority::parse(raw).ok_or_else(|| format!("unknown priority '{raw}' (low, normal, high)"))
}

fn parse_order(raw: &str) -> Result<ListOrder, String> {
    ListOrder::parse(raw).ok_or_else(|| format!("unknown order '{raw}' (created, date, priority)"))
}

/// A timer as printed by `list` and `show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimerView {
    #[serde(flatten)]
    timer: TimerRecord,
    status: LiveStatus,
    /// Human readable countdown, e.g. "3d 04:05:06".
    label: String,
}

impl TimerView {
    fn new(timer: TimerRecord, now: DateTime<Utc>, privacy_mode: bool) -> Self {
        let status = live_status(&timer, now);
        let label = countdown_label(&status);
        let timer = if privacy_mode { timer.masked() } else { timer };
        Self {
            timer,
            status,
            label,
        }
    }
}

/// Time since the target once it has passed, otherwise time left.
fn countdown_label(status: &LiveStatus) -> String {
    let parts = if status.is_due {
        status.elapsed
    } else {
        status.remaining.or(status.elapsed)
    };
    parts.map(|parts| parts.label()).unwrap_or_default()
}

pub fn run(action: TimerAction) -> CmdResult {
    let store = TimerStore::open()?;
    let privacy_mode = Config::load_or_default().display.privacy_mode;
    let now = Utc::now();

    match action {
        TimerAction::Add {
            title,
            date,
            person,
            priority,
            count_up,
            every,
            favourite,
        } => {
            let mut draft = TimerDraft::new(title, parse_date(&date)?);
            draft.person_name = person.unwrap_or_default();
            draft.priority = priority.unwrap_or_default();
            draft.is_countdown = !count_up;
            draft.is_favourite = favourite;
            if let Some(every) = every {
                draft = draft.every(every);
            }
            print_json(&store.create(draft, now)?)?;
        }
        TimerAction::Edit {
            id,
            title,
            date,
            person,
            priority,
            countdown,
            every,
            once,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let is_recurring = if once {
                Some(false)
            } else {
                every.as_ref().map(|_| true)
            };
            let patch = TimerPatch {
                title,
                person_name: person,
                priority,
                date,
                is_countdown: countdown,
                is_favourite: None,
                is_recurring,
                recurrence_interval: if once { Some(String::new()) } else { every },
            };
            print_json(&store.update(&id, patch, now)?)?;
        }
        TimerAction::Delete { id } => {
            print_json(&store.delete(&id, now)?)?;
        }
        TimerAction::Clear => {
            print_json(&store.clear(now)?)?;
        }
        TimerAction::Favourite { id } => {
            print_json(&store.toggle_favourite(&id, now)?)?;
        }
        TimerAction::List { order, favourites } => {
            let timers = if favourites {
                store.favourites(order, now)?
            } else {
                store.list(order, now)?
            };
            let views: Vec<_> = timers
                .into_iter()
                .map(|t| TimerView::new(t, now, privacy_mode))
                .collect();
            print_json(&views)?;
        }
        TimerAction::Show { id } => {
            let timer = store.require(&id)?;
            print_json(&TimerView::new(timer, now, privacy_mode))?;
        }
        TimerAction::Refresh => {
            let events = store.refresh_next_dates(now)?;
            tracing::info!(changed = events.len(), "next dates refreshed");
            print_json(&events)?;
        }
        TimerAction::Export => {
            println!("{}", store.export_json(now)?);
        }
        TimerAction::Import { file, overwrite } => {
            let json = std::fs::read_to_string(&file).map_err(CoreError::Io)?;
            print_json(&store.import_json(&json, overwrite, now)?)?;
        }
    }
    Ok(())
}
