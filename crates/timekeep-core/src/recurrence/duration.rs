//! Display decomposition of a duration into calendar-ish parts.
//!
//! This uses fixed approximations (365-day year, 30.44-day month) and is only
//! meant for rendering. Projection arithmetic lives in `calendar`.

use serde::{Deserialize, Serialize};

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;
const YEAR_MS: u64 = 365 * DAY_MS;
/// 30.44 days, the average Gregorian month.
const MONTH_MS: u64 = 3044 * DAY_MS / 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Compact label such as `1y 2mo 3d 04:05:06`; leading zero units are omitted.
    pub fn label(&self) -> String {
        let mut out = String::new();
        for (value, suffix) in [(self.years, "y"), (self.months, "mo"), (self.days, "d")] {
            if value > 0 || !out.is_empty() {
                out.push_str(&format!("{value}{suffix} "));
            }
        }
        out.push_str(&format!(
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        ));
        out
    }
}

/// Greedily split `milliseconds` into parts. Negative input counts as zero.
pub fn decompose_duration(milliseconds: i64) -> TimeParts {
    let mut rest = u64::try_from(milliseconds).unwrap_or(0);

    let mut take = |unit: u64| {
        let whole = rest / unit;
        rest %= unit;
        whole
    };

    TimeParts {
        years: take(YEAR_MS),
        months: take(MONTH_MS),
        days: take(DAY_MS),
        hours: take(HOUR_MS),
        minutes: take(MINUTE_MS),
        seconds: take(SECOND_MS),
    }
}
