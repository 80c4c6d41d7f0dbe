//! Period Aggregator & Summary Generator

use crate::config::SummarizerConfig;
use crate::error::SummarizerError;
use crate::fallback::fallback_narrative;
use crate::grouping::{group_by_period, PeriodGroup};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use worklog_domain::{
    Cancellation, DateRange, ExtractionResult, Granularity, NarrativeSource, PeriodSummary, ProgressTracker, Stage,
};
use worklog_extractor::{ExtractionClient, ExtractorError, NarrativeRequest};

/// Summaries produced by one aggregation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutcome {
    /// One summary per non-empty period, chronological
    pub summaries: Vec<PeriodSummary>,
    /// Periods whose narrative was built by [`fallback_narrative`]
    pub narrative_fallbacks: usize,
    /// Results ignored because their date fell outside the range
    pub out_of_range: usize,
    /// Stopped early by cancellation; `summaries` holds the periods finished
    pub cancelled: bool,
    /// Wall time of the pass
    pub elapsed: Duration,
}

/// Groups extraction results into periods and writes one narrative per period
///
/// Narrative requests go through the same [`ExtractionClient`] (and therefore
/// the same retry, fallback and breaker state) as extraction.
pub struct Aggregator {
    client: Arc<ExtractionClient>,
    config: SummarizerConfig,
}

impl Aggregator {
    /// Create an aggregator sharing `client` with the extraction stage
    pub fn new(client: Arc<ExtractionClient>, config: SummarizerConfig) -> Result<Self, SummarizerError> {
        config.validate().map_err(SummarizerError::Config)?;
        Ok(Self { client, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Build summaries for every period of `range` that has results
    ///
    /// Must be called after all extraction for the range has finished.
    /// Never fails: a period whose narrative cannot be generated gets a
    /// deterministic one instead.
    pub async fn aggregate(
        &self,
        results: &[ExtractionResult],
        granularity: Granularity,
        range: &DateRange,
        progress: &ProgressTracker,
        cancel: &Cancellation,
    ) -> AggregationOutcome {
        let started = Instant::now();
        let grouping = group_by_period(results, granularity, range);
        if !grouping.out_of_range.is_empty() {
            warn!(
                count = grouping.out_of_range.len(),
                "Ignoring extraction results outside the requested range"
            );
        }

        info!(
            periods = grouping.groups.len(),
            granularity = %granularity,
            "Aggregating {} results",
            results.len()
        );
        progress.begin_stage(Stage::Aggregation, grouping.groups.len());

        let mut outcome = AggregationOutcome {
            out_of_range: grouping.out_of_range.len(),
            ..Default::default()
        };

        for group in grouping.groups {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            match self.summarize(group, cancel).await {
                Some(summary) => {
                    match &summary.narrative_source {
                        NarrativeSource::Fallback { reason } => {
                            outcome.narrative_fallbacks += 1;
                            progress.advance_with_error(format!(
                                "{}: fallback narrative ({})",
                                summary.period.label(),
                                reason
                            ));
                        }
                        NarrativeSource::Generated { .. } => progress.advance(),
                    }
                    outcome.summaries.push(summary);
                }
                None => {
                    outcome.cancelled = true;
                    break;
                }
            }
        }

        outcome.elapsed = started.elapsed();
        info!(
            summaries = outcome.summaries.len(),
            fallbacks = outcome.narrative_fallbacks,
            cancelled = outcome.cancelled,
            "Aggregation finished"
        );
        outcome
    }

    /// Summarize one period; `None` only on cancellation
    async fn summarize(&self, group: PeriodGroup, cancel: &Cancellation) -> Option<PeriodSummary> {
        let started = Instant::now();
        let label = group.period.label();
        let request = NarrativeRequest {
            period: group.period,
            entry_count: group.entry_count(),
            entry_dates: group.entry_dates.clone(),
            entities: group.entities.clone(),
            max_entities_per_kind: self.config.max_entities_in_prompt,
        };

        let (narrative, narrative_source) = match self.client.generate_narrative(&request, cancel).await {
            Ok(narrative) => {
                let chars = narrative.text.chars().count();
                if chars < self.config.min_narrative_chars {
                    warn!(period = %label, chars, "Generated narrative too short, using fallback");
                    self.fallback(&group, format!("narrative too short ({} chars)", chars))
                } else {
                    debug!(period = %label, provider = %narrative.provider, "Narrative generated");
                    (
                        narrative.text,
                        NarrativeSource::Generated {
                            provider: narrative.provider,
                        },
                    )
                }
            }
            Err(ExtractorError::Cancelled) => return None,
            Err(e) => {
                warn!(period = %label, error = %e, "Narrative generation failed, using fallback");
                self.fallback(&group, e.to_string())
            }
        };

        Some(PeriodSummary {
            period: group.period,
            entry_count: group.entry_count(),
            entities: group.entities,
            entry_dates: group.entry_dates,
            narrative,
            narrative_source,
            generation_time: started.elapsed(),
        })
    }

    fn fallback(&self, group: &PeriodGroup, reason: String) -> (String, NarrativeSource) {
        (
            fallback_narrative(&group.period, &group.entities, group.entry_count()),
            NarrativeSource::Fallback { reason },
        )
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator").field("config", &self.config).finish()
    }
}
