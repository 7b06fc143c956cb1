//! LLM endpoint configuration
//!
//! Resolves an OpenAI-compatible chat endpoint from the environment:
//! 1. `LLM_BASE_URL` + `LLM_API_KEY` - any compatible endpoint, highest priority
//! 2. `OPENAI_API_KEY` - OpenAI
//! 3. `OPENROUTER_API_KEY` - OpenRouter
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Self-hosted or proxy endpoint
//! export LLM_BASE_URL="http://localhost:8000/v1"
//! export LLM_API_KEY="local-key"
//!
//! # Option 2: Provider API key
//! export OPENAI_API_KEY="sk-..."
//! ```

use secrecy::SecretString;

/// Environment variable names
mod env_vars {
    pub const LLM_BASE_URL: &str = "LLM_BASE_URL";
    pub const LLM_API_KEY: &str = "LLM_API_KEY";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
}

/// Provider base URLs
mod providers {
    pub const OPENAI: &str = "https://api.openai.com/v1";
    pub const OPENROUTER: &str = "https://openrouter.ai/api/v1";
}

/// Resolved chat-completions endpoint
#[derive(Debug, Clone)]
pub struct LlmEndpoint {
    pub base_url: String,
    pub api_key: SecretString,
}

impl LlmEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Resolve from environment variables, or `None` if no credentials are set.
    pub fn from_env() -> Option<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // Priority 1: explicit endpoint
        if let Some(url) = get(env_vars::LLM_BASE_URL) {
            tracing::debug!("Using LLM_BASE_URL for chat completions");
            let key = get(env_vars::LLM_API_KEY).unwrap_or_default();
            return Some(Self::new(url, key.into()));
        }

        // Priority 2: OpenAI
        if let Some(key) = get(env_vars::OPENAI_API_KEY) {
            tracing::info!("Using OpenAI for chat completions");
            return Some(Self::new(providers::OPENAI, key.into()));
        }

        // Priority 3: OpenRouter
        if let Some(key) = get(env_vars::OPENROUTER_API_KEY) {
            tracing::info!("Using OpenRouter for chat completions");
            return Some(Self::new(providers::OPENROUTER, key.into()));
        }

        None
    }
}
