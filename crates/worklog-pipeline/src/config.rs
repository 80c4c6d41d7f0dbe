//! Run configuration loaded from TOML

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use worklog_domain::Granularity;
use worklog_extractor::ExtractorConfig;
use worklog_ingest::ProcessorConfig;
use worklog_llm::ProviderConfig;
use worklog_summarizer::SummarizerConfig;

/// Where worklogs are read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Root of the `worklogs_YYYY/...` hierarchy
    pub base_dir: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("worklogs"),
        }
    }
}

/// Where reports are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report directory, created when absent
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
        }
    }
}

/// Period aggregation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Granularity used when a run does not name one
    pub granularity: Granularity,

    /// Entities listed per kind in the narrative prompt
    pub max_entities_in_prompt: usize,

    /// Shorter generated narratives are replaced by the fallback narrative
    pub min_narrative_chars: usize,
}

impl SummaryConfig {
    /// Aggregator settings
    pub fn summarizer(&self) -> SummarizerConfig {
        SummarizerConfig {
            max_entities_in_prompt: self.max_entities_in_prompt,
            min_narrative_chars: self.min_narrative_chars,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        let summarizer = SummarizerConfig::default();
        Self {
            granularity: Granularity::Week,
            max_entities_in_prompt: summarizer.max_entities_in_prompt,
            min_narrative_chars: summarizer.min_narrative_chars,
        }
    }
}

/// Complete configuration of a pipeline
///
/// ```toml
/// extraction_concurrency = 8
///
/// [input]
/// base_dir = "/home/me/worklogs"
///
/// [output]
/// dir = "/home/me/reports"
///
/// [summary]
/// granularity = "week"
///
/// [[providers]]
/// name = "local"
/// kind = "ollama"
/// model = "llama3.2"
///
/// [[providers]]
/// name = "cloud"
/// kind = "openai"
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Files extracted concurrently across all providers
    pub extraction_concurrency: usize,

    /// Input location
    pub input: InputConfig,

    /// Output location
    pub output: OutputConfig,

    /// Content Processor settings
    pub processing: ProcessorConfig,

    /// Extraction Client settings
    pub extraction: ExtractorConfig,

    /// Aggregation settings
    pub summary: SummaryConfig,

    /// Providers in fallback order; the first is the primary
    pub providers: Vec<ProviderConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_concurrency: 8,
            input: InputConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessorConfig::default(),
            extraction: ExtractorConfig::default(),
            summary: SummaryConfig::default(),
            providers: vec![ProviderConfig::ollama("ollama", "llama3.2")],
        }
    }
}

impl PipelineConfig {
    /// Validate every section
    ///
    /// An empty provider list is reported as [`PipelineError::NoProviders`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.providers.is_empty() {
            return Err(PipelineError::NoProviders);
        }
        if self.extraction_concurrency == 0 {
            return Err(PipelineError::Config(
                "extraction_concurrency must be greater than 0".to_string(),
            ));
        }

        self.processing
            .validate()
            .map_err(|e| PipelineError::Config(format!("processing: {}", e)))?;
        self.extraction
            .validate()
            .map_err(|e| PipelineError::Config(format!("extraction: {}", e)))?;
        self.summary
            .summarizer()
            .validate()
            .map_err(|e| PipelineError::Config(format!("summary: {}", e)))?;

        let mut names = std::collections::HashSet::new();
        for provider in &self.providers {
            provider.validate().map_err(PipelineError::Config)?;
            if !names.insert(provider.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate provider name '{}'",
                    provider.name
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str).map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
