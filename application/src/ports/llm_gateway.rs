//! LLM Gateway port
//!
//! Defines the interface for communicating with model backends.

use async_trait::async_trait;
use council_domain::{ChatMessage, Model};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Request rejected ({status}): {message}")]
    ClientRejected { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// How the resilient client should treat a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Network-level failure, retried with the normal backoff
    Transient,
    /// Provider throttling, retried with a longer backoff
    RateLimited,
    /// Not worth retrying
    Permanent,
}

impl GatewayError {
    pub fn retry_class(&self) -> RetryClass {
        match self {
            GatewayError::ConnectionError(_)
            | GatewayError::Timeout
            | GatewayError::ServerError { .. } => RetryClass::Transient,
            GatewayError::RateLimited => RetryClass::RateLimited,
            GatewayError::ClientRejected { .. }
            | GatewayError::InvalidResponse(_)
            | GatewayError::Other(_) => RetryClass::Permanent,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retry_class() != RetryClass::Permanent
    }
}

/// A successful completion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelReply {
    pub content: String,
    /// Reasoning trace, when the backend exposes one
    pub reasoning: Option<Value>,
}

impl ModelReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Value) -> Self {
        self.reasoning = Some(reasoning);
        self
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to model backends.
/// Implementations (adapters) live in the infrastructure layer. A gateway
/// performs exactly one request per call; retries belong to
/// [`ResilientClient`](crate::client::ResilientClient).
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a chat completion request to one model
    async fn complete(
        &self,
        model: &Model,
        messages: &[ChatMessage],
    ) -> Result<ModelReply, GatewayError>;
}
