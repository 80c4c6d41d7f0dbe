//! Error types for discovery and processing

use chrono::NaiveDate;
use thiserror::Error;
use worklog_domain::DomainError;

/// Fatal errors of the ingest stages
///
/// Per-file problems are not errors; see [`crate::SkipReason`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    /// End date precedes start date
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DomainError> for IngestError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRange { start, end } => IngestError::InvalidRange { start, end },
            DomainError::Parse(msg) => IngestError::Config(msg),
        }
    }
}
