//! Summarize command implementation.

use crate::cli::SummarizeArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::sync::Arc;
use tracing::{debug, warn};
use worklog_domain::{cancellation, ProgressObserver, ProgressUpdate};
use worklog_pipeline::{Pipeline, PipelineConfig, RunRequest};

/// Logs every progress snapshot at debug level.
struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        debug!(
            stage = update.stage.as_str(),
            processed = update.processed,
            total = update.total,
            errors = update.errors.len(),
            "Progress"
        );
    }
}

/// Execute the summarize command.
pub async fn execute_summarize(args: SummarizeArgs, mut config: PipelineConfig, formatter: &Formatter) -> Result<()> {
    if let Some(input) = args.input {
        config.input.base_dir = input;
    }
    if let Some(output) = args.output {
        config.output.dir = output;
    }

    let pipeline = Pipeline::from_config(&config)?;

    let mut request = RunRequest::new(args.start, args.end);
    if let Some(granularity) = args.granularity {
        request = request.with_granularity(granularity.into());
    }

    let (handle, cancel) = cancellation();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current step");
            handle.cancel();
        }
    });

    let outcome = pipeline.run(&request, Arc::new(LogObserver), &cancel).await;
    interrupt.abort();
    let outcome = outcome?;

    println!("{}", formatter.format_run(&outcome));
    Ok(())
}
