//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use worklog_domain::Granularity;

/// Worklog - Summarize dated work journals into weekly or monthly reports.
#[derive(Debug, Parser)]
#[command(name = "worklog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.worklog/config.toml)
    #[arg(short, long, global = true, env = "WORKLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a date range and write a markdown report
    Summarize(SummarizeArgs),

    /// List which worklogs of a date range exist
    Discover(DiscoverArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the summarize command.
#[derive(Debug, Parser)]
pub struct SummarizeArgs {
    /// First date (YYYY-MM-DD), inclusive
    pub start: NaiveDate,

    /// Last date (YYYY-MM-DD), inclusive
    pub end: NaiveDate,

    /// Period granularity (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub granularity: Option<GranularityArg>,

    /// Worklog root directory (overrides input.base_dir)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Report directory (overrides output.dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the discover command.
#[derive(Debug, Parser)]
pub struct DiscoverArgs {
    /// First date (YYYY-MM-DD), inclusive
    pub start: NaiveDate,

    /// Last date (YYYY-MM-DD), inclusive
    pub end: NaiveDate,

    /// Worklog root directory (overrides input.base_dir)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Only list missing dates
    #[arg(long)]
    pub missing_only: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

/// Granularity argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GranularityArg {
    /// Monday-to-Sunday weeks
    Week,
    /// Calendar months
    Month,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Week => Granularity::Week,
            GranularityArg::Month => Granularity::Month,
        }
    }
}
