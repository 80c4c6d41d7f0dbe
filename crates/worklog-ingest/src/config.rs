//! Configuration for the Content Processor

use serde::{Deserialize, Serialize};

/// Configuration for the Content Processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Files larger than this are skipped as oversized without being read (bytes)
    pub max_file_bytes: u64,

    /// Sanitized text longer than this is truncated at a line boundary (characters)
    pub max_content_chars: usize,

    /// Number of files read concurrently
    pub workers: usize,

    /// Minimum plausibility score for a sniffed legacy encoding to be accepted
    pub min_encoding_confidence: f32,

    /// Encodings tried in order when sniffing is inconclusive (WHATWG labels)
    pub fallback_encodings: Vec<String>,
}

impl Default for ProcessorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_content_chars: 50_000,
            workers: 8,
            min_encoding_confidence: 0.9,
            fallback_encodings: vec![
                "utf-8".to_string(),
                "windows-1252".to_string(),
                "iso-8859-15".to_string(),
            ],
        }
    }
}

impl ProcessorConfig {
    /// Aggressive preset: small files, tight content budget, more workers
    pub fn aggressive() -> Self {
        Self {
            max_file_bytes: 256 * 1024,
            max_content_chars: 20_000,
            workers: 16,
            ..Self::default()
        }
    }

    /// Lenient preset: large files, generous content budget, forgiving sniffing
    pub fn lenient() -> Self {
        Self {
            max_file_bytes: 8 * 1024 * 1024,
            max_content_chars: 200_000,
            workers: 4,
            min_encoding_confidence: 0.6,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_bytes == 0 {
            return Err("max_file_bytes must be greater than 0".to_string());
        }
        if self.max_content_chars == 0 {
            return Err("max_content_chars must be greater than 0".to_string());
        }
        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_encoding_confidence) {
            return Err("min_encoding_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.fallback_encodings.is_empty() {
            return Err("fallback_encodings must name at least one encoding".to_string());
        }
        for label in &self.fallback_encodings {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(format!("unknown encoding label: {}", label));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
