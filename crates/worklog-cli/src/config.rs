//! Configuration file location and loading for the CLI.

use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use worklog_pipeline::PipelineConfig;

/// Default configuration file path: `~/.worklog/config.toml`.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".worklog").join("config.toml"))
}

/// The file to use: the explicit path, or the default one.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_path(),
    }
}

/// Load the pipeline configuration.
///
/// An explicitly named file must exist; a missing default file means
/// built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let path = resolve_path(explicit)?;

    if path.exists() {
        let contents = fs::read_to_string(&path)?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else if explicit.is_some() {
        Err(CliError::Config(format!("Config file not found: {}", path.display())))
    } else {
        Ok(PipelineConfig::default())
    }
}

/// Write the default configuration to `path`, creating parent directories.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = PipelineConfig::default().to_toml()?;
    fs::write(path, contents)?;
    Ok(())
}
