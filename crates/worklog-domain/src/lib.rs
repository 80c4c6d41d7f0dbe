//! Worklog Domain Layer
//!
//! Core value types and pure functions shared by every stage of the worklog
//! summarization pipeline. Nothing in this crate performs I/O.
//!
//! ## Key Concepts
//!
//! - **Week-ending anchor**: the Sunday that names the storage directory for a date
//! - **Period**: a week (Monday start) or calendar month used for aggregation,
//!   clipped to the requested range
//! - **EntitySet**: case/whitespace-insensitive set of extracted entity names that
//!   keeps the first-seen spelling for display
//! - **Progress**: an observer interface invoked at file and period boundaries
//!
//! ## Architecture
//!
//! ```text
//! PathResolver → Discovery → ContentProcessor → ExtractionClient → Aggregator → ReportEmitter
//! ```
//!
//! Only the left-most pieces (dates, layout, records) live here; stage logic
//! lives in the downstream crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod date;
pub mod entity;
pub mod error;
pub mod layout;
pub mod period;
pub mod progress;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use date::{month_end, month_start, week_ending, week_start, DateRange};
pub use entity::{normalize_entity, Entities, EntityKind, EntitySet};
pub use error::DomainError;
pub use layout::PathResolver;
pub use period::{periods_for, Granularity, Period};
pub use progress::{ProgressTracker, ProgressUpdate, Stage};
pub use record::{Diagnostic, DiscoveredFile, ExtractionResult, PeriodSummary, ProcessedContent, NarrativeSource};
pub use traits::{NoopObserver, ProgressObserver};
