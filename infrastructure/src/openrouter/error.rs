//! Error types for the OpenRouter adapter

use thiserror::Error;

/// Errors raised while setting up the OpenRouter client
#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("OpenRouter API key is missing (set COUNCIL_PROVIDER__API_KEY or OPENROUTER_API_KEY)")]
    MissingApiKey,

    #[error("Invalid API key format")]
    InvalidApiKey,

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
