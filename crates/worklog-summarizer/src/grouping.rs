//! Assign extraction results to periods

use chrono::NaiveDate;
use std::collections::BTreeMap;
use worklog_domain::{DateRange, Entities, ExtractionResult, Granularity, Period};

/// Extraction results that fall into one period, merged
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGroup {
    /// Period, clipped to the requested range
    pub period: Period,
    /// Union of the entities of every entry in the period
    pub entities: Entities,
    /// Dates of the merged entries, ascending
    pub entry_dates: Vec<NaiveDate>,
}

impl PeriodGroup {
    /// Number of merged entries
    pub fn entry_count(&self) -> usize {
        self.entry_dates.len()
    }
}

/// Result of [`group_by_period`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    /// Non-empty periods in chronological order
    pub groups: Vec<PeriodGroup>,
    /// Dates of results that fell outside the requested range
    pub out_of_range: Vec<NaiveDate>,
}

/// Group results by the period containing their date
///
/// Results are merged in date order so the first-seen spelling of an entity
/// is the chronologically first one, whatever order the input is in. Periods
/// without results are not produced.
pub fn group_by_period(results: &[ExtractionResult], granularity: Granularity, range: &DateRange) -> Grouping {
    let mut ordered: Vec<&ExtractionResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let mut groups: BTreeMap<NaiveDate, PeriodGroup> = BTreeMap::new();
    let mut out_of_range = Vec::new();

    for result in ordered {
        let Some(period) = Period::containing(result.date, granularity, range) else {
            out_of_range.push(result.date);
            continue;
        };

        let group = groups.entry(period.anchor).or_insert_with(|| PeriodGroup {
            period,
            entities: Entities::new(),
            entry_dates: Vec::new(),
        });
        group.entities.merge(&result.entities);
        group.entry_dates.push(result.date);
    }

    Grouping {
        groups: groups.into_values().collect(),
        out_of_range,
    }
}
