//! Worklog CLI - summarize dated work journals into periodic reports.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use worklog_cli::{commands, config, Cli, Command, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> worklog_cli::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let formatter = Formatter::new(!cli.no_color);
    let explicit = cli.config.as_deref();

    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, explicit, &formatter).await?;
        }
        Command::Summarize(args) => {
            let loaded = config::load(explicit)?;
            commands::execute_summarize(args, loaded, &formatter).await?;
        }
        Command::Discover(args) => {
            let loaded = config::load(explicit)?;
            commands::execute_discover(args, &loaded, &formatter).await?;
        }
    }

    Ok(())
}
