//! Worklog Pipeline
//!
//! Runs the whole batch summarization for a date range:
//!
//! ```text
//! FileDiscovery → ContentProcessor → ExtractionClient → Aggregator → ReportEmitter
//! ```
//!
//! Each stage completes before the next one starts. Progress is pushed to an
//! injected [`ProgressObserver`](worklog_domain::ProgressObserver) at every
//! file and period boundary, and a [`Cancellation`](worklog_domain::Cancellation)
//! stops the run at the next checkpoint with partial statistics.
//!
//! # Usage
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//! use worklog_domain::{Cancellation, NoopObserver};
//! use worklog_pipeline::{Pipeline, PipelineConfig, RunRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_file("worklog.toml")?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let request = RunRequest::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
//! );
//! let outcome = pipeline
//!     .run(&request, Arc::new(NoopObserver), &Cancellation::never())
//!     .await?;
//!
//! if let Some(report) = outcome.report {
//!     println!("Report written to {}", report.path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;

pub use config::{InputConfig, OutputConfig, PipelineConfig, SummaryConfig};
pub use error::PipelineError;
pub use pipeline::{Pipeline, RunOutcome, RunRequest};
