//! Error types for domain validation

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by domain constructors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// End date precedes start date
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// A value could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}
