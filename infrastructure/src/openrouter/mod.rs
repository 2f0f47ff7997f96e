//! OpenRouter adapter
//!
//! Implements the [`LlmGateway`](council_application::LlmGateway) port over
//! `POST {base_url}/chat/completions` with bearer authentication.

mod error;
mod gateway;
mod types;

pub use error::OpenRouterError;
pub use gateway::{DEFAULT_BASE_URL, OpenRouterGateway};
