//! Recurrence interval parsing.
//!
//! Intervals are persisted as plain strings of the form `"<count> <unit>"`
//! (`"2 days"`, `"1 month"`). [`parse_interval`] is the only place that
//! interprets that format; [`Interval`]'s `Display` produces it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit of a recurrence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
        Unit::Week,
        Unit::Month,
        Unit::Year,
    ];

    /// Canonical singular name.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Year => "year",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == name)
    }

    /// Length in milliseconds for fixed-duration units.
    ///
    /// Returns `None` for month and year, which depend on the calendar.
    pub fn fixed_millis(self) -> Option<i64> {
        match self {
            Unit::Second => Some(1_000),
            Unit::Minute => Some(60_000),
            Unit::Hour => Some(3_600_000),
            Unit::Day => Some(86_400_000),
            Unit::Week => Some(7 * 86_400_000),
            Unit::Month | Unit::Year => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed recurrence interval. `count` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub count: u32,
    pub unit: Unit,
}

impl Interval {
    /// Build an interval, rejecting a zero count.
    pub fn new(count: u32, unit: Unit) -> Option<Self> {
        (count >= 1).then_some(Self { count, unit })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.count, self.unit)
        }
    }
}

/// Parse a `"<count> <unit>"` string.
///
/// The count must be a positive base-10 integer. The unit is lower-cased and
/// a single trailing `s` is stripped. Anything malformed yields `None`, which
/// callers treat as "not recurring".
pub fn parse_interval(text: &str) -> Option<Interval> {
    let mut tokens = text.split_whitespace();
    let (count, unit) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(count), Some(unit), None) => (count, unit),
        _ => return None,
    };

    if !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count: u32 = count.parse().ok()?;

    let unit = unit.to_lowercase();
    let unit = unit.strip_suffix('s').unwrap_or(&unit);

    Interval::new(count, Unit::from_name(unit)?)
}
