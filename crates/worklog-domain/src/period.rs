//! Aggregation periods
//!
//! A period is either an ISO-style week (Monday through Sunday, keyed by its
//! Monday) or a calendar month (keyed `YYYY-MM`). Periods at the edges of the
//! requested range are clipped, so together they tile the range exactly.

use crate::date::{month_end, month_start, week_start, DateRange};
use crate::error::DomainError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Summary granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Monday-to-Sunday weeks
    #[default]
    Week,
    /// Calendar months
    Month,
}

impl Granularity {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Adjective used in report titles
    pub fn adjective(&self) -> &'static str {
        match self {
            Granularity::Week => "Weekly",
            Granularity::Month => "Monthly",
        }
    }

    /// Unclipped bounds of the period containing `date`
    pub fn bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Granularity::Week => {
                let start = week_start(date);
                (start, start + Duration::days(6))
            }
            Granularity::Month => (month_start(date), month_end(date)),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(DomainError::Parse(format!("Invalid granularity: {}", other))),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregation period, clipped to the requested range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Week or month
    pub granularity: Granularity,
    /// Unclipped period start (the Monday, or the 1st of the month)
    pub anchor: NaiveDate,
    /// Clipped range actually covered
    pub range: DateRange,
}

impl Period {
    /// The period containing `date`, clipped to `within`
    ///
    /// Returns `None` when `date` is outside `within`.
    pub fn containing(date: NaiveDate, granularity: Granularity, within: &DateRange) -> Option<Period> {
        if !within.contains(date) {
            return None;
        }
        let (start, end) = granularity.bounds(date);
        let range = within.clip(start, end)?;
        Some(Period {
            granularity,
            anchor: start,
            range,
        })
    }

    /// Stable identifier: the Monday date for weeks, `YYYY-MM` for months
    pub fn key(&self) -> String {
        match self.granularity {
            Granularity::Week => self.anchor.format("%Y-%m-%d").to_string(),
            Granularity::Month => self.anchor.format("%Y-%m").to_string(),
        }
    }

    /// Heading label, e.g. `Week of 2024-01-01` or `January 2024`
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Week => format!("Week of {}", self.anchor.format("%Y-%m-%d")),
            Granularity::Month => self.anchor.format("%B %Y").to_string(),
        }
    }

    /// Whether the period was clipped by the requested range
    pub fn is_partial(&self) -> bool {
        let (start, end) = self.granularity.bounds(self.anchor);
        self.range.start() != start || self.range.end() != end
    }
}

/// All periods intersecting `range`, in chronological order
///
/// The returned periods are contiguous and non-overlapping and their clipped
/// ranges exactly cover `range`.
pub fn periods_for(range: &DateRange, granularity: Granularity) -> Vec<Period> {
    let mut periods = Vec::new();
    let mut cursor = range.start();
    while let Some(period) = Period::containing(cursor, granularity, range) {
        let next = period.range.end() + Duration::days(1);
        periods.push(period);
        if next > range.end() {
            break;
        }
        cursor = next;
    }
    periods
}
