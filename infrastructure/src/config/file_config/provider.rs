//! OpenRouter provider configuration from TOML (`[provider]` section)

use crate::openrouter::DEFAULT_BASE_URL;
use council_application::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted when no key is configured
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    pub base_url: String,
    /// Upper bound on one model call
    pub timeout_seconds: u64,
    /// Total attempts per model call
    pub max_retries: u32,
    /// Backoff unit between attempts
    pub retry_base_delay_ms: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 120,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl FileProviderConfig {
    /// Configured key, falling back to `OPENROUTER_API_KEY`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or(fallback.filter(|k| !k.trim().is_empty()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_timeout(self.timeout())
    }
}
