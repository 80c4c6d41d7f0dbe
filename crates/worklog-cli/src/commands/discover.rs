//! Discover command implementation.

use crate::cli::DiscoverArgs;
use crate::error::Result;
use crate::output::Formatter;
use worklog_domain::PathResolver;
use worklog_ingest::FileDiscovery;
use worklog_pipeline::{PipelineConfig, PipelineError};

/// Execute the discover command.
pub async fn execute_discover(args: DiscoverArgs, config: &PipelineConfig, formatter: &Formatter) -> Result<()> {
    let base = args.input.unwrap_or_else(|| config.input.base_dir.clone());
    let discovery = FileDiscovery::new(PathResolver::new(base));

    let report = discovery
        .discover(args.start, args.end)
        .map_err(PipelineError::from)?;

    println!("{}", formatter.format_discovery(&report, args.missing_only));
    Ok(())
}
