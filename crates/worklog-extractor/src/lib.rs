//! Worklog Extractor
//!
//! Turns processed worklog text into structured entities, and period context
//! into narrative prose, through one or more LLM providers.
//!
//! # Architecture
//!
//! ```text
//! ProcessedContent → prompt → [provider 1 → provider 2 → ...] → parse → ExtractionResult
//! ```
//!
//! Each configured provider gets its own slot:
//!
//! - a [`CircuitBreaker`] (Closed → Open → HalfOpen → Closed) that skips a
//!   provider known to be down
//! - a semaphore capping concurrent calls
//! - a retry budget with exponential backoff for transient failures
//!
//! A request walks the providers in order until one succeeds. Structurally
//! invalid responses count as transient failures and are retried.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use worklog_domain::{Cancellation, ProcessedContent};
//! use worklog_extractor::{ExtractionClient, ExtractorConfig};
//! use worklog_llm::{LlmProvider, MockProvider};
//!
//! # async fn example(content: ProcessedContent) -> Result<(), Box<dyn std::error::Error>> {
//! let llm: Arc<dyn LlmProvider> = Arc::new(MockProvider::new(
//!     r#"{"projects":["Atlas"],"participants":[],"tasks":[],"themes":[]}"#,
//! ));
//! let client = ExtractionClient::new(vec![llm], ExtractorConfig::default())?;
//!
//! let result = client.extract(&content, &Cancellation::never()).await?;
//! println!("{} entities from {}", result.entities.total(), result.provider);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod breaker;
mod client;
mod config;
mod error;
mod parser;
mod prompt;
mod retry;
mod stats;
mod types;


pub use breaker::{Admission, CircuitBreaker, CircuitState};
pub use client::ExtractionClient;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use parser::{parse_extraction, parse_narrative, ParsedExtraction};
pub use prompt::{ExtractionPromptBuilder, NarrativePromptBuilder};
pub use retry::BackoffPolicy;
pub use stats::{ClientStats, ProviderStats};
pub use types::{Narrative, NarrativeRequest};
