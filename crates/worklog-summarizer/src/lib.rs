//! Worklog Summarizer
//!
//! Groups per-file extraction results into weekly or monthly periods and
//! produces one [`PeriodSummary`](worklog_domain::PeriodSummary) per period
//! that has entries.
//!
//! # Flow
//!
//! ```text
//! [ExtractionResult] → group_by_period → merge entities → generate_narrative → [PeriodSummary]
//!                                                              ↓ (failure / too short)
//!                                                      fallback_narrative
//! ```
//!
//! Period boundaries come from [`worklog_domain::Period`]: weeks start on
//! Monday, months on the 1st, and the first and last period are clipped to
//! the requested range. A run always yields a summary for every non-empty
//! period because narrative failures fall back to a sentence built from the
//! aggregated entities.

#![warn(missing_docs)]

mod aggregator;
mod config;
mod error;
mod fallback;
mod grouping;

#[cfg(test)]
mod tests;

pub use aggregator::{AggregationOutcome, Aggregator};
pub use config::SummarizerConfig;
pub use error::SummarizerError;
pub use fallback::fallback_narrative;
pub use grouping::{group_by_period, Grouping, PeriodGroup};
