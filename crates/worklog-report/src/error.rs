//! Error types for report emission

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// The output directory or file could not be written; never retried
    #[error("Cannot write report to {}: {source}", path.display())]
    OutputWrite {
        /// Directory or file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Markdown rendering failed
    #[error("Report formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}
