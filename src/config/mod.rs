//! Configuration for the trading-competition agent

pub mod llm;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::api::{ApiClient, RetryPolicy};
use crate::{Error, Result};

// Re-export LLM endpoint resolution
pub use llm::LlmEndpoint;

/// Competition API key environment variable name
pub const API_KEY_ENV: &str = "TRADING_API_KEY";
/// Competition API base URL environment variable name
pub const API_URL_ENV: &str = "TRADING_API_URL";
/// Per-attempt request timeout override (seconds)
pub const API_TIMEOUT_ENV: &str = "TRADING_API_TIMEOUT_SECS";
/// Chat model override
pub const LLM_MODEL_ENV: &str = "LLM_MODEL";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Retry settings as they appear in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry (milliseconds); doubles per attempt
    pub base_delay_ms: u64,
    /// Upper bound on any single delay (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// Competition API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://competitions.example/api`
    pub base_url: String,
    /// Per-attempt timeout (seconds)
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Build a client for this API, reading the key from `TRADING_API_KEY`.
    pub fn client_from_env(&self) -> Result<ApiClient> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
        if key.trim().is_empty() {
            return Err(Error::Config(format!("{} is empty", API_KEY_ENV)));
        }
        self.client(key.into())
    }

    pub fn client(&self, api_key: secrecy::SecretString) -> Result<ApiClient> {
        ApiClient::with_options(
            &self.base_url,
            api_key,
            Duration::from_secs(self.timeout_secs),
            RetryPolicy::from(&self.retry),
        )
    }
}

/// Agent model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat model name
    pub model: String,
    /// Maximum model round-trips that may request tool calls
    pub max_tool_rounds: u32,
    /// Per-attempt timeout for completion requests (seconds)
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tool_rounds: 4,
            timeout_secs: 120,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            tracing::debug!("Using {} for API base URL", API_URL_ENV);
            self.api.base_url = url;
        }
        if let Ok(secs) = std::env::var(API_TIMEOUT_ENV) {
            match secs.parse() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid {}", API_TIMEOUT_ENV),
            }
        }
        if let Ok(model) = std::env::var(LLM_MODEL_ENV) {
            self.llm.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::Config(format!("api.base_url {:?}: {}", self.api.base_url, e))
        })?;
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be positive".to_string()));
        }
        if self.llm.max_tool_rounds == 0 {
            return Err(Error::Config("llm.max_tool_rounds must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_uses_defaults() {
        let value = serde_json::json!({
            "api": { "base_url": "https://comp.example/api", "timeout_secs": 10 }
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.api.base_url, "https://comp.example/api");
        assert_eq!(parsed.api.retry.max_retries, 3);
        assert_eq!(parsed.llm.max_tool_rounds, 4);
    }

    #[test]
    fn retry_config_converts_to_policy() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 2_000,
        });
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api": {{"base_url": "https://comp.example/api", "timeout_secs": 5,
                "retry": {{"max_retries": 1, "base_delay_ms": 10, "max_delay_ms": 20}}}},
               "llm": {{"model": "test-model", "max_tool_rounds": 2, "timeout_secs": 30}}}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.retry.max_retries, 1);
        assert_eq!(config.llm.model, "test-model");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "::not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.max_tool_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn builds_client_with_explicit_key() {
        let client = ApiConfig::default()
            .client(secrecy::SecretString::from("k".to_string()))
            .unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_URL);
        assert_eq!(client.retry_policy().max_retries, 3);
    }
}
