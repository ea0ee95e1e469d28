use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Daily, TimeRange::Weekly, TimeRange::Monthly];

    /// First day covered by the range when it ends on `today`.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        match self {
            TimeRange::Daily => today,
            TimeRange::Weekly => today - Duration::days(6),
            TimeRange::Monthly => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= self.start(today) && date <= today
    }

    pub fn days(self, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        self.start(today).iter_days().take_while(move |d| *d <= today)
    }

    pub fn next(self) -> Self {
        match self {
            TimeRange::Daily => TimeRange::Weekly,
            TimeRange::Weekly => TimeRange::Monthly,
            TimeRange::Monthly => TimeRange::Daily,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Daily => "daily",
            TimeRange::Weekly => "weekly",
            TimeRange::Monthly => "monthly",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d" | "day" | "daily" | "today" => Ok(TimeRange::Daily),
            "w" | "week" | "weekly" => Ok(TimeRange::Weekly),
            "m" | "month" | "monthly" => Ok(TimeRange::Monthly),
            _ => Err(anyhow!("Unknown time range: {}", s)),
        }
    }
}
