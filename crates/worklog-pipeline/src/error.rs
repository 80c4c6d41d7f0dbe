//! Error types for pipeline runs

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use worklog_domain::DomainError;
use worklog_extractor::ExtractorError;
use worklog_ingest::IngestError;
use worklog_llm::LlmError;
use worklog_report::ReportError;
use worklog_summarizer::SummarizerError;

/// Fatal errors that abort a run
///
/// Per-file and per-provider failures never surface here; they are counted
/// in [`worklog_report::RunStats`] instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// End date precedes start date
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// No provider configured
    #[error("No LLM provider configured")]
    NoProviders,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured provider could not be constructed
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    /// The report could not be written
    #[error("Cannot write report to {}: {source}", path.display())]
    OutputWrite {
        /// Directory or file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The report could not be rendered
    #[error("Report error: {0}")]
    Report(String),
}

impl From<DomainError> for PipelineError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRange { start, end } => PipelineError::InvalidRange { start, end },
            DomainError::Parse(msg) => PipelineError::Config(msg),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::InvalidRange { start, end } => PipelineError::InvalidRange { start, end },
            IngestError::Config(msg) => PipelineError::Config(msg),
        }
    }
}

impl From<ExtractorError> for PipelineError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::NoProviders => PipelineError::NoProviders,
            other => PipelineError::Config(other.to_string()),
        }
    }
}

impl From<SummarizerError> for PipelineError {
    fn from(e: SummarizerError) -> Self {
        match e {
            SummarizerError::Config(msg) => PipelineError::Config(msg),
        }
    }
}

impl From<ReportError> for PipelineError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::OutputWrite { path, source } => PipelineError::OutputWrite { path, source },
            ReportError::Format(e) => PipelineError::Report(e.to_string()),
        }
    }
}
