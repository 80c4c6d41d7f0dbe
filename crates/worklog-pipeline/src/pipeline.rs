//! Orchestration of all stages for one run

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;
use worklog_domain::{
    Cancellation, DateRange, ExtractionResult, Granularity, PathResolver, PeriodSummary, ProcessedContent,
    ProgressObserver, ProgressTracker, ProgressUpdate, Stage,
};
use worklog_extractor::{ExtractionClient, ExtractorConfig, ExtractorError};
use worklog_ingest::{ContentProcessor, FileDiscovery};
use worklog_llm::{LlmProvider, Provider};
use worklog_report::{ExtractionFailure, ReportEmitter, ReportResult, RunStats};
use worklog_summarizer::{Aggregator, SummarizerConfig};

/// Parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    /// First date, inclusive
    pub start: NaiveDate,
    /// Last date, inclusive
    pub end: NaiveDate,
    /// Overrides the configured granularity
    pub granularity: Option<Granularity>,
}

impl RunRequest {
    /// Request for `[start, end]` at the configured granularity
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            granularity: None,
        }
    }

    /// Use `granularity` instead of the configured one
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Run identifier, also printed in the report header
    pub run_id: Uuid,
    /// Written report; `None` when the run was cancelled
    pub report: Option<ReportResult>,
    /// Period summaries, chronological
    pub summaries: Vec<PeriodSummary>,
    /// Extraction results, chronological
    pub results: Vec<ExtractionResult>,
    /// Statistics, partial when cancelled
    pub stats: RunStats,
    /// Stopped by the cancellation signal
    pub cancelled: bool,
    /// Last progress record
    pub progress: ProgressUpdate,
}

/// The batch summarization pipeline
///
/// Stages run strictly in order, each one finishing before the next starts:
/// discovery, processing, extraction, aggregation, reporting. Provider state
/// (circuit breakers, statistics) is created fresh for every run.
pub struct Pipeline {
    discovery: FileDiscovery,
    processor: ContentProcessor,
    providers: Vec<Arc<dyn LlmProvider>>,
    extractor_config: ExtractorConfig,
    summarizer_config: SummarizerConfig,
    emitter: ReportEmitter,
    granularity: Granularity,
    extraction_concurrency: usize,
}

impl Pipeline {
    /// Build a pipeline and its providers from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let providers = config
            .providers
            .iter()
            .map(|p| Provider::from_config(p).map(|p| Arc::new(p) as Arc<dyn LlmProvider>))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config, providers)
    }

    /// Build a pipeline with explicit providers (primary first)
    ///
    /// The `providers` section of `config` is ignored.
    pub fn new(config: &PipelineConfig, providers: Vec<Arc<dyn LlmProvider>>) -> Result<Self, PipelineError> {
        if providers.is_empty() {
            return Err(PipelineError::NoProviders);
        }
        if config.extraction_concurrency == 0 {
            return Err(PipelineError::Config(
                "extraction_concurrency must be greater than 0".to_string(),
            ));
        }
        config.extraction.validate().map_err(PipelineError::Config)?;
        let summarizer_config = config.summary.summarizer();
        summarizer_config.validate().map_err(PipelineError::Config)?;

        Ok(Self {
            discovery: FileDiscovery::new(PathResolver::new(&config.input.base_dir)),
            processor: ContentProcessor::new(config.processing.clone())?,
            providers,
            extractor_config: config.extraction.clone(),
            summarizer_config,
            emitter: ReportEmitter::new(&config.output.dir),
            granularity: config.summary.granularity,
            extraction_concurrency: config.extraction_concurrency,
        })
    }

    /// File discovery over the configured input directory
    pub fn discovery(&self) -> &FileDiscovery {
        &self.discovery
    }

    /// Names of the providers in fallback order
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Run every stage over `request`
    ///
    /// Per-file and per-provider failures are recorded in the outcome's
    /// statistics. Only an invalid range, invalid configuration or an
    /// unwritable output directory fail the run. When `cancel` fires, the
    /// run stops at the next checkpoint and returns partial statistics
    /// without writing a report.
    pub async fn run(
        &self,
        request: &RunRequest,
        observer: Arc<dyn ProgressObserver>,
        cancel: &Cancellation,
    ) -> Result<RunOutcome, PipelineError> {
        let started = Instant::now();
        let range = DateRange::new(request.start, request.end)?;
        let granularity = request.granularity.unwrap_or(self.granularity);
        let run_id = Uuid::now_v7();
        let progress = ProgressTracker::new(observer);

        info!(run_id = %run_id, range = %range, granularity = %granularity, "Starting run");

        let mut run = RunState {
            run_id,
            progress: progress.clone(),
            stats: RunStats::new(run_id, range, granularity),
            started,
            results: Vec::new(),
            summaries: Vec::new(),
        };

        // Discovery
        progress.begin_stage(Stage::Discovery, 1);
        let discovery = self.discovery.discover_range(&range);
        run.stats.files_expected = discovery.total_expected;
        run.stats.files_found = discovery.found.len();
        run.stats.missing_dates = discovery.missing_dates();
        progress.advance();
        info!(
            found = discovery.found.len(),
            missing = discovery.missing.len(),
            "Discovered {} of {} expected worklogs",
            discovery.found.len(),
            discovery.total_expected
        );
        if cancel.is_cancelled() {
            return Ok(run.cancelled());
        }

        // Processing
        progress.begin_stage(Stage::Processing, discovery.found.len());
        let (contents, processing) = self.processor.process(&discovery.found, &progress, cancel).await;
        let processing_cancelled = processing.cancelled;
        run.stats.processing = processing;
        if processing_cancelled || cancel.is_cancelled() {
            return Ok(run.cancelled());
        }

        // Extraction
        let client = Arc::new(ExtractionClient::new(
            self.providers.clone(),
            self.extractor_config.clone(),
        )?);
        progress.begin_stage(Stage::Extraction, contents.len());
        let extraction_cancelled = self.extract_all(&client, &contents, &mut run, cancel).await;
        run.stats.extraction = client.stats();
        if extraction_cancelled {
            return Ok(run.cancelled());
        }

        // Aggregation starts only after every extraction has finished
        let aggregator = Aggregator::new(Arc::clone(&client), self.summarizer_config.clone())?;
        let aggregation = aggregator
            .aggregate(&run.results, granularity, &range, &progress, cancel)
            .await;
        run.stats.extraction = client.stats();
        run.stats.narrative_fallbacks = aggregation.narrative_fallbacks;
        run.summaries = aggregation.summaries;
        if aggregation.cancelled {
            return Ok(run.cancelled());
        }

        // Reporting
        progress.begin_stage(Stage::Reporting, 1);
        run.stats.elapsed = started.elapsed();
        let report = self.emitter.emit(&run.summaries, &range, granularity, &run.stats)?;
        progress.advance();
        progress.begin_stage(Stage::Complete, 0);

        info!(
            run_id = %run_id,
            path = %report.path.display(),
            "Run complete: {}",
            run.stats.summary()
        );
        Ok(run.finish(Some(report), false))
    }

    /// Extract every file; returns whether the run was cancelled
    async fn extract_all(
        &self,
        client: &ExtractionClient,
        contents: &[ProcessedContent],
        run: &mut RunState,
        cancel: &Cancellation,
    ) -> bool {
        let mut cancelled = false;
        let mut outcomes = stream::iter(contents)
            .map(|content| async move { (content.date, client.extract(content, cancel).await) })
            .buffer_unordered(self.extraction_concurrency);

        while let Some((date, outcome)) = outcomes.next().await {
            match outcome {
                Ok(result) => {
                    debug!(date = %date, provider = %result.provider, "Extracted");
                    run.results.push(result);
                    run.progress.advance();
                }
                Err(ExtractorError::Cancelled) => cancelled = true,
                Err(e) => {
                    warn!(date = %date, error = %e, "No extraction result for worklog");
                    run.progress.advance_with_error(format!("{}: {}", date, e));
                    let failure = match e {
                        ExtractorError::AllProvidersFailed { provider, reason } => {
                            ExtractionFailure::new(date, Some(provider), reason)
                        }
                        other => ExtractionFailure::new(date, None, other.to_string()),
                    };
                    run.stats.extraction_failures.push(failure);
                }
            }
        }

        run.results.sort_by_key(|r| r.date);
        run.stats.extraction_failures.sort_by_key(|f| f.date);
        cancelled || cancel.is_cancelled()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("discovery", &self.discovery)
            .field("providers", &self.provider_names())
            .field("granularity", &self.granularity)
            .field("output_dir", &self.emitter.output_dir())
            .finish()
    }
}

/// Accumulates one run's partial results
struct RunState {
    run_id: Uuid,
    progress: ProgressTracker,
    stats: RunStats,
    started: Instant,
    results: Vec<ExtractionResult>,
    summaries: Vec<PeriodSummary>,
}

impl RunState {
    fn cancelled(self) -> RunOutcome {
        warn!(run_id = %self.run_id, "Run cancelled");
        self.progress.begin_stage(Stage::Cancelled, 0);
        self.finish(None, true)
    }

    fn finish(mut self, report: Option<ReportResult>, cancelled: bool) -> RunOutcome {
        self.stats.elapsed = self.started.elapsed();
        RunOutcome {
            run_id: self.run_id,
            report,
            progress: self.progress.snapshot(),
            summaries: self.summaries,
            results: self.results,
            stats: self.stats,
            cancelled,
        }
    }
}
