//! Integration tests for the Aggregator

#[cfg(test)]
mod tests {
    use crate::{Aggregator, SummarizerConfig};
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use worklog_domain::{
        cancellation, Cancellation, DateRange, Entities, ExtractionResult, Granularity, NarrativeSource,
        NoopObserver, ProgressTracker, ProgressUpdate, Stage,
    };
    use worklog_extractor::{ExtractionClient, ExtractorConfig};
    use worklog_llm::{LlmError, LlmProvider, MockProvider};

    const NARRATIVE: &str = "You spent the week moving Atlas towards its beta release.";

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn result(date: NaiveDate, project: &str) -> ExtractionResult {
        let mut entities = Entities::new();
        entities.projects.insert(project);
        entities.participants.insert("Dana");
        ExtractionResult {
            path: PathBuf::from(format!("worklog_{}.txt", date)),
            date,
            entities,
            latency: Duration::ZERO,
            confidence: None,
            raw_response: None,
            provider: "mock".to_string(),
        }
    }

    fn fast_config() -> ExtractorConfig {
        ExtractorConfig {
            max_attempts: 2,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            ..ExtractorConfig::default()
        }
    }

    fn aggregator(providers: Vec<MockProvider>) -> Aggregator {
        let providers: Vec<Arc<dyn LlmProvider>> = providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
            .collect();
        let client = Arc::new(ExtractionClient::new(providers, fast_config()).unwrap());
        Aggregator::new(client, SummarizerConfig::default()).unwrap()
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(NoopObserver))
    }

    #[tokio::test]
    async fn test_one_summary_per_week() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let results: Vec<_> = range.days().map(|day| result(day, "Atlas")).collect();
        let agg = aggregator(vec![MockProvider::new(NARRATIVE).with_name("primary")]);

        let outcome = agg
            .aggregate(&results, Granularity::Week, &range, &tracker(), &Cancellation::never())
            .await;

        assert!(!outcome.cancelled);
        assert_eq!(outcome.narrative_fallbacks, 0);
        assert_eq!(outcome.summaries.len(), 2);
        for summary in &outcome.summaries {
            assert_eq!(summary.entry_count, 7);
            assert_eq!(summary.narrative, NARRATIVE);
            assert_eq!(
                summary.narrative_source,
                NarrativeSource::Generated {
                    provider: "primary".into()
                }
            );
            assert_eq!(summary.entities.projects.to_vec(), vec!["Atlas"]);
        }
        assert_eq!(outcome.summaries[0].period.anchor, d(1));
        assert_eq!(outcome.summaries[1].period.anchor, d(8));
    }

    #[tokio::test]
    async fn test_narrative_failure_uses_fallback() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let results = vec![result(d(2), "Atlas"), result(d(9), "Billing")];

        let mut provider = MockProvider::new(NARRATIVE);
        provider.add_error("Period: Week of 2024-01-08", LlmError::RateLimitExceeded);
        let agg = aggregator(vec![provider]);

        let outcome = agg
            .aggregate(&results, Granularity::Week, &range, &tracker(), &Cancellation::never())
            .await;

        assert_eq!(outcome.summaries.len(), 2);
        assert_eq!(outcome.narrative_fallbacks, 1);
        assert_eq!(outcome.summaries[0].narrative, NARRATIVE);

        let second = &outcome.summaries[1];
        assert!(matches!(second.narrative_source, NarrativeSource::Fallback { .. }));
        assert!(second.narrative.starts_with("During the week of 2024-01-08"));
        assert!(second.narrative.contains("Projects: Billing."));
    }

    #[tokio::test]
    async fn test_short_narrative_replaced() {
        let range = DateRange::new(d(1), d(7)).unwrap();
        let agg = aggregator(vec![MockProvider::new("Busy week.")]);

        let outcome = agg
            .aggregate(&[result(d(3), "Atlas")], Granularity::Week, &range, &tracker(), &Cancellation::never())
            .await;

        let summary = &outcome.summaries[0];
        assert_eq!(
            summary.narrative_source,
            NarrativeSource::Fallback {
                reason: "narrative too short (10 chars)".into()
            }
        );
        assert!(summary.narrative.contains("Atlas"));
    }

    #[tokio::test]
    async fn test_partial_month_periods() {
        let range = DateRange::new(d(20), NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()).unwrap();
        let results = vec![result(d(22), "Atlas"), result(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(), "Atlas")];
        let agg = aggregator(vec![MockProvider::new(NARRATIVE)]);

        let outcome = agg
            .aggregate(&results, Granularity::Month, &range, &tracker(), &Cancellation::never())
            .await;

        assert_eq!(outcome.summaries.len(), 2);
        assert_eq!(outcome.summaries[0].period.range.start(), d(20));
        assert!(outcome.summaries[0].period.is_partial());
        assert_eq!(
            outcome.summaries[1].period.range.end(),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn test_progress_reports_each_period() {
        let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::default();
        let sink = updates.clone();
        let progress = ProgressTracker::new(Arc::new(move |u: &ProgressUpdate| {
            sink.lock().unwrap().push(u.clone());
        }));

        let range = DateRange::new(d(1), d(21)).unwrap();
        let results = vec![result(d(1), "A"), result(d(10), "B"), result(d(20), "C")];
        let mut provider = MockProvider::new(NARRATIVE);
        provider.add_error("Period: Week of 2024-01-15", LlmError::Authentication("nope".into()));
        let agg = aggregator(vec![provider]);

        agg.aggregate(&results, Granularity::Week, &range, &progress, &Cancellation::never())
            .await;

        let updates = updates.lock().unwrap();
        let last = updates.last().unwrap();
        assert_eq!(last.stage, Stage::Aggregation);
        assert_eq!((last.processed, last.total), (3, 3));
        assert_eq!(last.errors.len(), 1);
        assert!(last.errors[0].starts_with("Week of 2024-01-15: fallback narrative"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let provider = MockProvider::new(NARRATIVE);
        let calls = provider.clone();
        let agg = aggregator(vec![provider]);
        let (handle, signal) = cancellation();
        handle.cancel();

        let outcome = agg
            .aggregate(&[result(d(2), "Atlas")], Granularity::Week, &range, &tracker(), &signal)
            .await;

        assert!(outcome.cancelled);
        assert!(outcome.summaries.is_empty());
        assert_eq!(calls.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_results_no_summaries() {
        let range = DateRange::new(d(1), d(14)).unwrap();
        let agg = aggregator(vec![MockProvider::new(NARRATIVE)]);
        let outcome = agg
            .aggregate(&[], Granularity::Week, &range, &tracker(), &Cancellation::never())
            .await;
        assert!(outcome.summaries.is_empty());
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let client = Arc::new(
            ExtractionClient::new(vec![Arc::new(MockProvider::default()) as Arc<dyn LlmProvider>], fast_config())
                .unwrap(),
        );
        let config = SummarizerConfig {
            max_entities_in_prompt: 0,
            ..Default::default()
        };
        assert!(Aggregator::new(client, config).is_err());
    }
}
