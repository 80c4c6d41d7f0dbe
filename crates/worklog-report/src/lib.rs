//! Worklog Report
//!
//! Renders period summaries and run statistics as a markdown document and
//! writes it atomically into an output directory.
//!
//! The document layout is:
//!
//! ```text
//! # Weekly Worklog Summary: <start> to <end>
//! - header fields (range, granularity, run id, generated, files)
//! ## <period label> (<clipped range>)      one per period, chronological
//! ## Processing Notes
//! ### Files / Missing Dates / Skipped Files / Extraction Failures
//! ### Providers / Unique Entities / Timing
//! ```
//!
//! File names are `worklog_summary_{granularity}_{start}_to_{end}_{YYYYmmdd_HHMMSS}.md`;
//! an existing report is never overwritten.

#![warn(missing_docs)]

mod emitter;
mod error;
mod markdown;
mod stats;

pub use emitter::{report_stem, ReportEmitter, ReportResult};
pub use error::ReportError;
pub use markdown::{render_markdown, NOTES_HEADING};
pub use stats::{ExtractionFailure, RunStats};
