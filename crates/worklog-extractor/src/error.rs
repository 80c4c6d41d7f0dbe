//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction or narrative generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// No provider configured at all
    #[error("No LLM provider configured")]
    NoProviders,

    /// Every provider was skipped or exhausted its retry budget
    #[error("All providers failed (last tried: {provider}): {reason}")]
    AllProvidersFailed {
        /// Last provider tried
        provider: String,
        /// Its final failure
        reason: String,
    },

    /// The run was cancelled
    #[error("Extraction cancelled")]
    Cancelled,

    /// Response did not have the expected structure
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
