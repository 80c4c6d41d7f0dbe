//! Request and response types for narrative generation

use chrono::NaiveDate;
use std::time::Duration;
use worklog_domain::{Entities, Period};

/// Context for one period's narrative
#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    /// Period being summarized
    pub period: Period,
    /// Number of worklog entries merged into the period
    pub entry_count: usize,
    /// Dates that contributed entries
    pub entry_dates: Vec<NaiveDate>,
    /// Merged entities
    pub entities: Entities,
    /// Maximum entities listed per kind in the prompt
    pub max_entities_per_kind: usize,
}

/// Generated narrative prose
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    /// Plain text, trimmed
    pub text: String,
    /// Provider that wrote it
    pub provider: String,
    /// Wall time including retries and fallbacks
    pub latency: Duration,
}
