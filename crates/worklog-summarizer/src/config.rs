//! Configuration for the Period Aggregator

use serde::{Deserialize, Serialize};

/// Configuration for the Period Aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Entities listed per kind in the narrative prompt
    pub max_entities_in_prompt: usize,

    /// Generated narratives shorter than this (in characters) are replaced
    /// by the fallback narrative
    pub min_narrative_chars: usize,
}

impl SummarizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entities_in_prompt == 0 {
            return Err("max_entities_in_prompt must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: short prompts
    pub fn aggressive() -> Self {
        Self {
            max_entities_in_prompt: 10,
            min_narrative_chars: 20,
        }
    }

    /// Lenient preset: long prompts, accept any non-empty narrative
    pub fn lenient() -> Self {
        Self {
            max_entities_in_prompt: 50,
            min_narrative_chars: 1,
        }
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

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_entities_in_prompt: 25,
            min_narrative_chars: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(SummarizerConfig::default().validate().is_ok());
        assert!(SummarizerConfig::aggressive().validate().is_ok());
        assert!(SummarizerConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_zero_prompt_entities_rejected() {
        let config = SummarizerConfig {
            max_entities_in_prompt: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SummarizerConfig::from_toml("min_narrative_chars = 5").unwrap();
        assert_eq!(config.min_narrative_chars, 5);
        assert_eq!(config.max_entities_in_prompt, 25);
        assert_eq!(SummarizerConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
    }
}
