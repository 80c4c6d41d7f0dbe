//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub async fn execute_config(
    args: ConfigArgs,
    explicit: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let path = config::resolve_path(explicit)?;
            config::init(&path, force)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
        ConfigAction::Show => {
            print!("{}", config::load(explicit)?.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config::resolve_path(explicit)?.display());
        }
    }
    Ok(())
}
