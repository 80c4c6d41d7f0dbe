//! Processing statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Why a discovered file did not produce content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Sanitized content was empty or whitespace-only
    Empty,
    /// File exceeded the size limit and was not read
    Oversized {
        /// Size on disk
        size: u64,
        /// Configured limit
        limit: u64,
    },
    /// No encoding could decode the bytes
    Encoding(String),
    /// The file could not be read
    Io(String),
}

impl SkipReason {
    /// Whether this counts as a failure rather than a benign skip
    pub fn is_failure(&self) -> bool {
        matches!(self, SkipReason::Encoding(_) | SkipReason::Io(_))
    }

    /// Short lowercase tag for tables and logs
    pub fn tag(&self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::Oversized { .. } => "oversized",
            SkipReason::Encoding(_) => "encoding",
            SkipReason::Io(_) => "io",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "empty"),
            SkipReason::Oversized { size, limit } => {
                write!(f, "oversized ({} bytes, limit {})", size, limit)
            }
            SkipReason::Encoding(msg) => write!(f, "unreadable encoding: {}", msg),
            SkipReason::Io(msg) => write!(f, "read error: {}", msg),
        }
    }
}

/// A file excluded from later stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Source path
    pub path: PathBuf,
    /// Entry date
    pub date: NaiveDate,
    /// Reason for exclusion
    pub reason: SkipReason,
}

/// Statistics for one processing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Files handed to the processor
    pub total: usize,
    /// Files that produced content
    pub processed: usize,
    /// Excluded files, in date order
    pub skipped: Vec<SkippedFile>,
    /// Bytes read from processed files
    pub total_bytes: u64,
    /// Words across processed files
    pub total_words: usize,
    /// Processed files carrying at least one diagnostic
    pub with_diagnostics: usize,
    /// Processed files that were truncated
    pub truncated: usize,
    /// Wall time
    pub elapsed: Duration,
    /// Whether the pass stopped early on cancellation
    pub cancelled: bool,
}

impl ProcessingStats {
    /// Files that failed (encoding or I/O)
    pub fn failed(&self) -> usize {
        self.skipped.iter().filter(|s| s.reason.is_failure()).count()
    }

    /// Files skipped as empty
    pub fn empty(&self) -> usize {
        self.count(|r| matches!(r, SkipReason::Empty))
    }

    /// Files skipped as oversized
    pub fn oversized(&self) -> usize {
        self.count(|r| matches!(r, SkipReason::Oversized { .. }))
    }

    /// Share of files that produced content
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Processing: {}/{} files ({:.1}% success), {} empty, {} oversized, {} failed, {} words, {} bytes in {:.2}s",
            self.processed,
            self.total,
            self.success_rate() * 100.0,
            self.empty(),
            self.oversized(),
            self.failed(),
            self.total_words,
            self.total_bytes,
            self.elapsed.as_secs_f64(),
        )
    }

    fn count(&self, pred: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| pred(&s.reason)).count()
    }
}
