//! File Discovery: which of the expected worklogs exist

use crate::error::IngestError;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use worklog_domain::{DateRange, DiscoveredFile, PathResolver};

/// Outcome of a discovery pass
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    /// Range that was scanned
    pub range: DateRange,
    /// Files that exist, in date order
    pub found: Vec<DiscoveredFile>,
    /// Expected paths that do not exist, in date order
    pub missing: Vec<PathBuf>,
    /// Number of dates in the range
    pub total_expected: usize,
    /// Wall time of the scan
    pub elapsed: Duration,
}

impl DiscoveryReport {
    /// Dates whose file is missing
    pub fn missing_dates(&self) -> Vec<NaiveDate> {
        self.missing
            .iter()
            .filter_map(|p| PathResolver::date_from_path(p))
            .collect()
    }
}

/// Enumerates expected worklog paths and checks which exist
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    resolver: PathResolver,
}

impl FileDiscovery {
    /// Create a discovery pass over `resolver`'s layout
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// The path resolver in use
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Discover files for the inclusive range `[start, end]`
    ///
    /// Fails with [`IngestError::InvalidRange`] when `end < start`. Missing
    /// files are reported, not treated as errors.
    pub fn discover(&self, start: NaiveDate, end: NaiveDate) -> Result<DiscoveryReport, IngestError> {
        let range = DateRange::new(start, end)?;
        Ok(self.discover_range(&range))
    }

    /// Discover files for an already validated range
    pub fn discover_range(&self, range: &DateRange) -> DiscoveryReport {
        let started = Instant::now();
        let mut found = Vec::new();
        let mut missing = Vec::new();

        // One existence check per date
        for date in range.days() {
            let path = self.resolver.expected_path(date);
            if path.is_file() {
                found.push(DiscoveredFile { path, date });
            } else {
                debug!(date = %date, path = %path.display(), "Worklog missing");
                missing.push(path);
            }
        }

        let report = DiscoveryReport {
            range: *range,
            total_expected: range.len_days(),
            found,
            missing,
            elapsed: started.elapsed(),
        };

        info!(
            range = %range,
            found = report.found.len(),
            missing = report.missing.len(),
            "Discovery complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_entry(resolver: &PathResolver, date: NaiveDate, body: &str) {
        let path = resolver.expected_path(date);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_found_and_missing_partition() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        for day in [1, 2, 4, 7] {
            write_entry(&resolver, d(2024, 1, day), "notes");
        }

        let report = FileDiscovery::new(resolver)
            .discover(d(2024, 1, 1), d(2024, 1, 7))
            .unwrap();

        assert_eq!(report.total_expected, 7);
        assert_eq!(report.found.len(), 4);
        assert_eq!(report.missing.len(), 3);
        assert_eq!(
            report.missing_dates(),
            vec![d(2024, 1, 3), d(2024, 1, 5), d(2024, 1, 6)]
        );
        let found_dates: Vec<_> = report.found.iter().map(|f| f.date).collect();
        assert_eq!(found_dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 4), d(2024, 1, 7)]);
    }

    #[test]
    fn test_range_across_year_boundary() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        write_entry(&resolver, d(2024, 12, 31), "old year");
        write_entry(&resolver, d(2025, 1, 1), "new year");

        let report = FileDiscovery::new(resolver)
            .discover(d(2024, 12, 30), d(2025, 1, 2))
            .unwrap();

        assert_eq!(report.total_expected, 4);
        assert_eq!(report.found.len(), 2);
        assert_eq!(report.missing_dates(), vec![d(2024, 12, 30), d(2025, 1, 2)]);
    }

    #[test]
    fn test_directory_in_place_of_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        fs::create_dir_all(resolver.expected_path(d(2024, 3, 1))).unwrap();

        let report = FileDiscovery::new(resolver)
            .discover(d(2024, 3, 1), d(2024, 3, 1))
            .unwrap();
        assert!(report.found.is_empty());
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let discovery = FileDiscovery::new(PathResolver::new("/nonexistent"));
        let err = discovery.discover(d(2024, 1, 7), d(2024, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            IngestError::InvalidRange {
                start: d(2024, 1, 7),
                end: d(2024, 1, 1)
            }
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn expected_count_matches_range(offset in 0i64..3000, len in 0i64..120) {
            let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(len);
            let report = FileDiscovery::new(PathResolver::new("/nonexistent/worklogs"))
                .discover(start, end)
                .unwrap();

            prop_assert_eq!(report.total_expected as i64, len + 1);
            prop_assert_eq!(report.found.len() + report.missing.len(), report.total_expected);
            let dates = report.missing_dates();
            prop_assert_eq!(dates.first().copied(), Some(start));
            prop_assert_eq!(dates.last().copied(), Some(end));
        }
    }
}
