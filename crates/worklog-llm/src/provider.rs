//! Closed set of provider variants selected by configuration

use crate::{LlmError, LlmProvider, MockProvider, OllamaProvider, OpenAiProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backend a configured provider talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
    /// Scripted in-process responses
    Mock,
}

/// One entry of the ordered provider list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name used in logs, statistics and attribution
    pub name: String,
    /// Backend
    pub kind: ProviderKind,
    /// Model identifier passed to the backend
    #[serde(default)]
    pub model: String,
    /// Base URL; backend default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Fixed reply for `kind = "mock"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<String>,
}

fn default_request_timeout() -> u64 {
    crate::ollama::DEFAULT_TIMEOUT_SECS
}

impl ProviderConfig {
    /// Local Ollama provider with default endpoint
    pub fn ollama(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Ollama,
            model: model.into(),
            endpoint: None,
            api_key_env: None,
            request_timeout_secs: default_request_timeout(),
            mock_response: None,
        }
    }

    /// Mock provider answering every prompt with `response`
    pub fn mock(name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Mock,
            model: String::new(),
            endpoint: None,
            api_key_env: None,
            request_timeout_secs: default_request_timeout(),
            mock_response: Some(response.into()),
        }
    }

    /// Check required fields for the selected backend
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("provider name must not be empty".to_string());
        }
        if self.kind != ProviderKind::Mock && self.model.trim().is_empty() {
            return Err(format!("provider '{}' requires a model", self.name));
        }
        if self.request_timeout_secs == 0 {
            return Err(format!(
                "provider '{}': request_timeout_secs must be greater than 0",
                self.name
            ));
        }
        Ok(())
    }
}

/// A configured provider
///
/// Dispatch is a plain `match`; adding a backend means adding a variant.
#[derive(Debug)]
pub enum Provider {
    /// Ollama backend
    Ollama(OllamaProvider),
    /// OpenAI-compatible backend
    OpenAi(OpenAiProvider),
    /// Scripted backend
    Mock(MockProvider),
}

impl Provider {
    /// Build a provider from its configuration
    ///
    /// Fails with [`LlmError::Authentication`] when `api_key_env` names a
    /// variable that is not set.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::InvalidRequest)?;
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let provider = match config.kind {
            ProviderKind::Ollama => {
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or(crate::ollama::DEFAULT_ENDPOINT);
                Provider::Ollama(
                    OllamaProvider::new(endpoint, &config.model)
                        .with_name(&config.name)
                        .with_timeout(timeout),
                )
            }
            ProviderKind::OpenAi => {
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or(crate::openai::DEFAULT_BASE_URL);
                let mut provider = OpenAiProvider::new(endpoint, &config.model)
                    .with_name(&config.name)
                    .with_timeout(timeout);
                if let Some(var) = &config.api_key_env {
                    let key = std::env::var(var).map_err(|_| {
                        LlmError::Authentication(format!(
                            "environment variable {} is not set for provider '{}'",
                            var, config.name
                        ))
                    })?;
                    provider = provider.with_api_key(key);
                }
                Provider::OpenAi(provider)
            }
            ProviderKind::Mock => {
                let response = config.mock_response.clone().unwrap_or_default();
                Provider::Mock(MockProvider::new(response).with_name(&config.name))
            }
        };
        Ok(provider)
    }
}

#[async_trait]
impl LlmProvider for Provider {
    fn name(&self) -> &str {
        match self {
            Provider::Ollama(p) => p.name(),
            Provider::OpenAi(p) => p.name(),
            Provider::Mock(p) => p.name(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self {
            Provider::Ollama(p) => p.generate(prompt).await,
            Provider::OpenAi(p) => p.generate(prompt).await,
            Provider::Mock(p) => p.generate(prompt).await,
        }
    }

    async fn generate_structured(&self, prompt: &str) -> Result<String, LlmError> {
        match self {
            Provider::Ollama(p) => p.generate_structured(prompt).await,
            Provider::OpenAi(p) => p.generate_structured(prompt).await,
            Provider::Mock(p) => p.generate_structured(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_toml() {
        let toml_src = r#"
            name = "local"
            kind = "ollama"
            model = "llama3"
        "#;
        let config: ProviderConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.kind, ProviderKind::Ollama);
        assert_eq!(config.request_timeout_secs, crate::ollama::DEFAULT_TIMEOUT_SECS);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&ProviderKind::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(serde_json::to_string(&ProviderKind::Mock).unwrap(), "\"mock\"");
    }

    #[test]
    fn test_validate() {
        assert!(ProviderConfig::ollama("local", "llama3").validate().is_ok());
        assert!(ProviderConfig::ollama("local", "").validate().is_err());
        assert!(ProviderConfig::ollama("", "llama3").validate().is_err());
        assert!(ProviderConfig::mock("m", "{}").validate().is_ok());
    }

    #[tokio::test]
    async fn test_from_config_mock() {
        let provider = Provider::from_config(&ProviderConfig::mock("scripted", "hi")).unwrap();
        assert_eq!(provider.name(), "scripted");
        assert_eq!(provider.generate("x").await.unwrap(), "hi");
    }

    #[test]
    fn test_from_config_ollama_name() {
        let provider = Provider::from_config(&ProviderConfig::ollama("local", "llama3")).unwrap();
        assert!(matches!(provider, Provider::Ollama(_)));
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn test_from_config_missing_api_key() {
        let mut config = ProviderConfig::ollama("remote", "gpt-4o-mini");
        config.kind = ProviderKind::OpenAi;
        config.api_key_env = Some("WORKLOG_TEST_KEY_THAT_IS_NEVER_SET".to_string());
        let err = Provider::from_config(&config).unwrap_err();
        assert!(matches!(err, LlmError::Authentication(_)));
    }
}
