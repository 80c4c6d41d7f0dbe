//! Per-provider and client-wide call statistics

use crate::breaker::CircuitState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Provider name
    pub name: String,
    /// Calls actually issued
    pub calls: u64,
    /// Calls that returned a usable response
    pub successes: u64,
    /// Calls that failed (including unusable responses)
    pub failures: u64,
    /// Retries scheduled after a transient failure
    pub retries: u64,
    /// Requests that skipped this provider because its circuit was open
    pub skipped_open: u64,
    /// Summed wall time of issued calls
    pub total_latency: Duration,
    /// Breaker state when the snapshot was taken
    pub circuit: CircuitState,
}

impl ProviderStats {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: 0,
            successes: 0,
            failures: 0,
            retries: 0,
            skipped_open: 0,
            total_latency: Duration::ZERO,
            circuit: CircuitState::Closed,
        }
    }

    /// Mean latency per issued call
    pub fn avg_latency(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total_latency / self.calls as u32
        }
    }
}

/// Snapshot of everything the client counted during a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientStats {
    /// One entry per provider, in fallback order
    pub providers: Vec<ProviderStats>,
    /// Times a request moved from one provider to the next
    pub fallback_events: u64,
    /// Extractions that produced a result
    pub extractions_succeeded: u64,
    /// Extractions that exhausted every provider
    pub extractions_failed: u64,
    /// Narratives generated by a provider
    pub narratives_succeeded: u64,
    /// Narrative requests that exhausted every provider
    pub narratives_failed: u64,
}

impl ClientStats {
    /// Calls issued across all providers
    pub fn total_calls(&self) -> u64 {
        self.providers.iter().map(|p| p.calls).sum()
    }

    /// Stats for a provider by name
    pub fn provider(&self, name: &str) -> Option<&ProviderStats> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let per_provider: Vec<String> = self
            .providers
            .iter()
            .map(|p| format!("{} {}/{} ok", p.name, p.successes, p.calls))
            .collect();
        format!(
            "Extraction: {} ok, {} failed; narratives: {} ok, {} failed; {} fallback events; providers: {}",
            self.extractions_succeeded,
            self.extractions_failed,
            self.narratives_succeeded,
            self.narratives_failed,
            self.fallback_events,
            per_provider.join(", "),
        )
    }
}
