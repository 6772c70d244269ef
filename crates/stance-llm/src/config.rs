//! Provider configuration
//!
//! The study runs against exactly one provider, so its key is mandatory and
//! startup fails without it.

use std::sync::Arc;

use crate::openai::{OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::provider::LlmProvider;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM provider configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub api_key: String,
    /// Model (env: STANCE_MODEL, default: gpt-4-turbo)
    pub model: String,
    /// API base URL (env: OPENAI_BASE_URL)
    pub base_url: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
        let base_url = non_empty("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "OPENAI_BASE_URL must be an http(s) URL, got {base_url}"
            )));
        }

        Ok(Self {
            api_key,
            model: non_empty("STANCE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
        })
    }

    /// Build the configured provider
    pub fn build_provider(&self) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAIProvider::new(&self.api_key, &self.model).with_base_url(&self.base_url))
    }
}
