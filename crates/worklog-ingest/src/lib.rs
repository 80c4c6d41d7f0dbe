//! Worklog Ingest - discovery and content processing
//!
//! The first two stages of the pipeline:
//!
//! 1. [`FileDiscovery`] walks every date of a range, resolves the expected
//!    path through [`worklog_domain::PathResolver`] and partitions the dates
//!    into found and missing files.
//! 2. [`ContentProcessor`] reads the found files on a bounded worker pool,
//!    decodes them (BOM, strict UTF-8, statistical sniffing, then a fixed
//!    fallback order), sanitizes and validates the text, and returns the
//!    survivors in date order together with [`ProcessingStats`].
//!
//! Per-file problems never abort a batch. They are recorded as a
//! [`SkipReason`] and surface in the final report.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use worklog_domain::PathResolver;
//! use worklog_ingest::FileDiscovery;
//!
//! let discovery = FileDiscovery::new(PathResolver::new("/home/me/worklogs"));
//! let report = discovery
//!     .discover(
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
//!     )
//!     .unwrap();
//! println!("{} found, {} missing", report.found.len(), report.missing.len());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod processor;
pub mod sanitize;
pub mod stats;

pub use config::ProcessorConfig;
pub use discovery::{DiscoveryReport, FileDiscovery};
pub use encoding::{decode, DecodeFailure, Decoded};
pub use error::IngestError;
pub use processor::ContentProcessor;
pub use sanitize::{sanitize, truncate_at_line};
pub use stats::{ProcessingStats, SkipReason, SkippedFile};
