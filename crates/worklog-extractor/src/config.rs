//! Configuration for the Extraction Client

use crate::retry::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extraction Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Attempts per provider per request, including the first
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u64,

    /// Upper bound for any single retry delay (milliseconds)
    pub max_backoff_ms: u64,

    /// Maximum time for a single provider call (seconds)
    pub call_timeout_secs: u64,

    /// Concurrent in-flight calls allowed per provider
    pub max_concurrent_per_provider: usize,

    /// Consecutive failures that open a provider's circuit
    pub failure_threshold: u32,

    /// Time an open circuit waits before allowing a probe (seconds)
    pub cooldown_secs: u64,

    /// Keep the unparsed model output on each result
    pub keep_raw_response: bool,
}

impl ExtractorConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get the breaker cooldown as a Duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Retry schedule derived from this configuration
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err("max_backoff_ms cannot be less than initial_backoff_ms".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if self.max_concurrent_per_provider == 0 {
            return Err("max_concurrent_per_provider must be greater than 0".to_string());
        }
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            call_timeout_secs: 120,
            max_concurrent_per_provider: 4,
            failure_threshold: 5,
            cooldown_secs: 60,
            keep_raw_response: false,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fail fast and move on to the next provider
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 5_000,
            call_timeout_secs: 30,
            max_concurrent_per_provider: 8,
            failure_threshold: 3,
            cooldown_secs: 30,
            keep_raw_response: false,
        }
    }

    /// Lenient preset: patient retries for slow local models
    pub fn lenient() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
            call_timeout_secs: 300,
            max_concurrent_per_provider: 2,
            failure_threshold: 10,
            cooldown_secs: 120,
            keep_raw_response: false,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_attempts() {
        let mut config = ExtractorConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_backoff_bounds() {
        let mut config = ExtractorConfig::default();
        config.max_backoff_ms = config.initial_backoff_ms - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::aggressive();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_durations() {
        let config = ExtractorConfig::default();
        assert_eq!(config.call_timeout(), Duration::from_secs(120));
        assert_eq!(config.cooldown(), Duration::from_secs(60));
    }
}
