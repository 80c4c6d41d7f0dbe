//! Calendar arithmetic for storage anchors and aggregation periods
//!
//! Two different week conventions are in play and are deliberately kept apart:
//! - [`week_ending`] is the Sunday anchor used to name storage directories
//! - [`week_start`] is the Monday that identifies an aggregation week

use crate::error::DomainError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sunday on or after `date` (a Sunday maps to itself)
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use worklog_domain::week_ending;
///
/// let wednesday = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
/// assert_eq!(week_ending(wednesday), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
/// ```
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    date + Duration::days(6 - weekday)
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(weekday)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(next) => next - Duration::days(1),
        // Only reachable at the edge of chrono's representable range
        None => date,
    }
}

/// An inclusive calendar date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, always at least 1
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterate every date in the range in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Intersect with `[start, end]`, returning `None` when disjoint
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<DateRange> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        DateRange::new(start, end).ok()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        // 1990-01-01 .. roughly 2090
        (0i64..36_500).prop_map(|offset| {
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(offset)
        })
    }

    proptest! {
        /// Property: week_ending is a Sunday on or after the date, at most 6 days away
        #[test]
        fn test_week_ending_is_following_sunday(date in any_date()) {
            let anchor = week_ending(date);
            prop_assert_eq!(anchor.weekday(), Weekday::Sun);
            prop_assert!(anchor >= date);
            prop_assert!((anchor - date).num_days() <= 6);
        }

        /// Property: week_ending is idempotent
        #[test]
        fn test_week_ending_idempotent(date in any_date()) {
            prop_assert_eq!(week_ending(week_ending(date)), week_ending(date));
        }

        /// Property: range length matches iteration count
        #[test]
        fn test_range_len_matches_iteration(start in any_date(), span in 0i64..800) {
            let range = DateRange::new(start, start + Duration::days(span)).unwrap();
            prop_assert_eq!(range.days().count(), range.len_days());
            prop_assert_eq!(range.len_days() as i64, span + 1);
        }
    }
}
