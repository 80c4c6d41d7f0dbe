//! Worklog LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind a single capability trait.
//!
//! # Architecture
//!
//! Every provider exposes [`LlmProvider::generate`] (plain text) and
//! [`LlmProvider::generate_structured`] (JSON mode). Providers issue exactly one
//! request per call; retries, fallback and circuit breaking are the caller's
//! job (see `worklog-extractor`). Failures are typed so callers can tell a
//! transient outage from a permanent misconfiguration via [`LlmError::kind`].
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted responses for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: Any OpenAI-compatible chat completions endpoint
//! - `Provider`: Closed set of the above, built from a [`ProviderConfig`]
//!
//! # Examples
//!
//! ```
//! use worklog_llm::{LlmProvider, MockProvider};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = rt.block_on(provider.generate("test prompt")).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;
pub mod provider;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{Provider, ProviderConfig, ProviderKind};

/// Whether a failed call is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// May succeed if retried (rate limits, 5xx, timeouts, garbled output)
    Transient,
    /// Will fail again (bad credentials, malformed request, unknown model)
    Permanent,
}

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Provider asked us to slow down (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider-side failure (HTTP 5xx)
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// No response within the allotted time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Credentials rejected (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request rejected as malformed (HTTP 400/422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Call abandoned because the run was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Classify the failure for retry purposes
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::RateLimitExceeded
            | LlmError::Server { .. }
            | LlmError::Timeout(_)
            | LlmError::Communication(_)
            | LlmError::InvalidResponse(_) => FailureKind::Transient,
            LlmError::Authentication(_)
            | LlmError::InvalidRequest(_)
            | LlmError::ModelNotAvailable(_)
            | LlmError::Cancelled
            | LlmError::Other(_) => FailureKind::Permanent,
        }
    }

    /// Shorthand for `kind() == FailureKind::Transient`
    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }

    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            429 => LlmError::RateLimitExceeded,
            401 | 403 => LlmError::Authentication(format!("HTTP {}: {}", status, body)),
            404 => LlmError::ModelNotAvailable(body),
            400 | 413 | 422 => LlmError::InvalidRequest(format!("HTTP {}: {}", status, body)),
            408 | 500..=599 => LlmError::Server {
                status,
                message: body,
            },
            _ => LlmError::Other(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Map a transport error from `reqwest`
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else if err.is_decode() {
            LlmError::InvalidResponse(format!("Failed to parse response: {}", err))
        } else {
            LlmError::Communication(format!("Request failed: {}", err))
        }
    }
}

/// Capability interface every provider implements
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name used in logs, statistics and attribution
    fn name(&self) -> &str;

    /// Generate a plain-text completion
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generate a completion constrained to JSON output, where supported
    async fn generate_structured(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(prompt).await
    }
}

/// Scripted reply for a [`MockProvider`] rule
#[derive(Debug, Clone)]
enum MockReply {
    Respond(String),
    Fail(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Rules match when the prompt *contains* the registered fragment; the
/// first matching rule wins, otherwise the default applies.
///
/// # Examples
///
/// ```
/// use worklog_llm::{LlmError, LlmProvider, MockProvider};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(rt.block_on(provider.generate("any prompt")).unwrap(), "Fixed response");
///
/// // Fragment-matched responses and errors
/// let mut provider = MockProvider::default();
/// provider.add_response("hello", "world");
/// provider.add_error("boom", LlmError::RateLimitExceeded);
/// assert_eq!(rt.block_on(provider.generate("say hello")).unwrap(), "world");
/// assert!(rt.block_on(provider.generate("boom")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    default_response: String,
    structured_response: Option<String>,
    default_error: Option<LlmError>,
    latency: Option<Duration>,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: response.into(),
            structured_response: None,
            default_error: None,
            latency: None,
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider whose every call fails with `error`
    pub fn failing(error: LlmError) -> Self {
        let mut provider = Self::default();
        provider.default_error = Some(error);
        provider
    }

    /// Set the provider name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Default response for `generate_structured` (falls back to the plain default)
    pub fn with_structured_response(mut self, response: impl Into<String>) -> Self {
        self.structured_response = Some(response.into());
        self
    }

    /// Simulated per-call latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Respond with `response` whenever the prompt contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((fragment.into(), MockReply::Respond(response.into())));
    }

    /// Fail with `error` whenever the prompt contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>, error: LlmError) {
        lock(&self.rules).push((fragment.into(), MockReply::Fail(error)));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    async fn respond(&self, prompt: &str, default: &str) -> Result<String, LlmError> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let matched = lock(&self.rules)
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match matched {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            None => match &self.default_error {
                Some(error) => Err(error.clone()),
                None => Ok(default.to_string()),
            },
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.respond(prompt, &self.default_response).await
    }

    async fn generate_structured(&self, prompt: &str) -> Result<String, LlmError> {
        let default = self
            .structured_response
            .as_deref()
            .unwrap_or(&self.default_response);
        self.respond(prompt, default).await
    }
}
