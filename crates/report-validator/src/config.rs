//! Configuration for the LLM validator.

use std::env;

/// Default completions endpoint host.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";

/// Configuration for [`LlmValidator`](crate::LlmValidator).
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub api_url: String,

    /// API key. Without one every verdict is a fallback.
    pub api_key: Option<String>,

    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 300,
            temperature: 0.3,
            timeout_secs: 30,
        }
    }
}

impl ValidatorConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `OPENAI_API_KEY` - API key (validation falls back when unset)
    /// - `OPENAI_API_URL` - API URL (default: https://api.openai.com)
    /// - `VALIDATOR_MODEL` - Model name (default: gpt-4.1-2025-04-14)
    /// - `VALIDATOR_MAX_TOKENS` - Max tokens (default: 300)
    /// - `VALIDATOR_TEMPERATURE` - Temperature (default: 0.3)
    /// - `VALIDATOR_TIMEOUT_SECS` - Request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = env::var("OPENAI_API_URL").unwrap_or(defaults.api_url);

        let model = env::var("VALIDATOR_MODEL").unwrap_or(defaults.model);

        let max_tokens = env::var("VALIDATOR_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let temperature = env::var("VALIDATOR_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);

        let timeout_secs = env::var("VALIDATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout_secs,
        }
    }

    /// Create a new config builder.
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }
}

/// Builder for ValidatorConfig.
#[derive(Debug, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}
