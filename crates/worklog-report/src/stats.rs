//! Run statistics rendered in the processing notes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use worklog_domain::{DateRange, Granularity};
use worklog_extractor::ClientStats;
use worklog_ingest::ProcessingStats;

/// A worklog whose extraction produced no result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Entry date
    pub date: NaiveDate,
    /// Last provider tried, when any was
    pub provider: Option<String>,
    /// Final failure reason
    pub reason: String,
}

impl ExtractionFailure {
    /// Failure attributed to `provider`
    pub fn new(date: NaiveDate, provider: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            date,
            provider,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{} ({}): {}", self.date, provider, self.reason),
            None => write!(f, "{}: {}", self.date, self.reason),
        }
    }
}

/// Everything a run counted, from discovery to aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Run identifier (UUIDv7)
    pub run_id: Uuid,
    /// Requested range
    pub range: DateRange,
    /// Summary granularity
    pub granularity: Granularity,
    /// Dates in the range, one expected file each
    pub files_expected: usize,
    /// Files that existed
    pub files_found: usize,
    /// Dates whose file did not exist
    pub missing_dates: Vec<NaiveDate>,
    /// Content processing counters, including skipped files
    pub processing: ProcessingStats,
    /// Provider and fallback counters
    pub extraction: ClientStats,
    /// Worklogs whose extraction exhausted every provider, by date
    pub extraction_failures: Vec<ExtractionFailure>,
    /// Periods that got the deterministic narrative
    pub narrative_fallbacks: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl RunStats {
    /// Empty statistics for a run over `range`
    pub fn new(run_id: Uuid, range: DateRange, granularity: Granularity) -> Self {
        Self {
            run_id,
            range,
            granularity,
            files_expected: range.len_days(),
            files_found: 0,
            missing_dates: Vec::new(),
            processing: ProcessingStats::default(),
            extraction: ClientStats::default(),
            extraction_failures: Vec::new(),
            narrative_fallbacks: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Files that yielded an extraction result
    pub fn files_extracted(&self) -> usize {
        self.processing.processed.saturating_sub(self.extraction_failures.len())
    }

    /// Files that failed to decode, read, or extract
    ///
    /// Empty and oversized files are skipped, not failed.
    pub fn files_failed(&self) -> usize {
        self.processing.failed() + self.extraction_failures.len()
    }

    /// One-line summary for logs and terminal output
    pub fn summary(&self) -> String {
        format!(
            "{} expected, {} found, {} processed, {} extracted, {} failed, {} fallback events, {:.1}s",
            self.files_expected,
            self.files_found,
            self.processing.processed,
            self.files_extracted(),
            self.files_failed(),
            self.extraction.fallback_events,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let range = DateRange::new(start, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()).unwrap();
        let mut stats = RunStats::new(Uuid::now_v7(), range, Granularity::Week);
        assert_eq!(stats.files_expected, 7);

        stats.files_found = 5;
        stats.processing.total = 5;
        stats.processing.processed = 4;
        stats.extraction_failures = vec![ExtractionFailure::new(start, Some("primary".into()), "timeout")];
        assert_eq!(stats.files_extracted(), 3);
        assert_eq!(stats.files_failed(), 1);
        assert!(stats.summary().starts_with("7 expected, 5 found, 4 processed, 3 extracted, 1 failed"));
    }

    #[test]
    fn test_failure_display_names_provider() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let attributed = ExtractionFailure::new(date, Some("backup".into()), "Server error 503");
        assert_eq!(attributed.to_string(), "2024-01-02 (backup): Server error 503");
        let unattributed = ExtractionFailure::new(date, None, "no providers configured");
        assert_eq!(unattributed.to_string(), "2024-01-02: no providers configured");
    }
}
