//! Storage layout: where the worklog for a given date is expected to live
//!
//! ```text
//! base/worklogs_2024/worklogs_2024-01/week_ending_2024-01-07/worklog_2024-01-03.txt
//! ```
//!
//! The year and month directories follow the entry's own date, while the week
//! directory follows its Sunday anchor, so an entry from 2024-12-30 lives under
//! `worklogs_2024/worklogs_2024-12/week_ending_2025-01-05/`.

use crate::date::week_ending;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Maps calendar dates onto the dated directory hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Root directory of the layout
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Expected location of the worklog file for `date`. Pure; performs no I/O.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use worklog_domain::PathResolver;
    ///
    /// let resolver = PathResolver::new("/logs");
    /// let path = resolver.expected_path(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    /// assert!(path.ends_with("worklogs_2024/worklogs_2024-01/week_ending_2024-01-07/worklog_2024-01-03.txt"));
    /// ```
    pub fn expected_path(&self, date: NaiveDate) -> PathBuf {
        self.base
            .join(date.format("worklogs_%Y").to_string())
            .join(date.format("worklogs_%Y-%m").to_string())
            .join(format!("week_ending_{}", week_ending(date).format("%Y-%m-%d")))
            .join(format!("worklog_{}.txt", date.format("%Y-%m-%d")))
    }

    /// Recover the entry date from a worklog file name (`worklog_YYYY-MM-DD.txt`)
    pub fn date_from_path(path: &Path) -> Option<NaiveDate> {
        let stem = path.file_stem()?.to_str()?;
        let raw = stem.strip_prefix("worklog_")?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}
