//! Error types for period aggregation

use thiserror::Error;

/// Errors that can occur while building period summaries
///
/// Narrative failures are not errors; they fall back to a generated sentence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummarizerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
