//! OpenRouter chat-completions gateway

use super::error::OpenRouterError;
use super::types::{ChatApiRequest, ChatApiResponse};
use async_trait::async_trait;
use council_application::ports::llm_gateway::{GatewayError, LlmGateway, ModelReply};
use council_domain::{ChatMessage, Model};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Public OpenRouter endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// LLM Gateway implementation for the OpenRouter API
///
/// One call is one HTTP request; retries and per-attempt timeouts belong to
/// the resilient client. The HTTP timeout here is only a backstop.
#[derive(Debug, Clone)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterGateway {
    pub fn new(api_key: &str) -> Result<Self, OpenRouterError> {
        Self::with_config(api_key, DEFAULT_BASE_URL, Duration::from_secs(120))
    }

    pub fn with_config(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OpenRouterError> {
        if api_key.trim().is_empty() {
            return Err(OpenRouterError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| OpenRouterError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn complete(
        &self,
        model: &Model,
        messages: &[ChatMessage],
    ) -> Result<ModelReply, GatewayError> {
        let request = ChatApiRequest {
            model: model.as_str(),
            messages,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!("OpenRouter {} for {} ({} bytes)", status, model, body.len());

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        parse_reply(&body)
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(err.to_string())
    }
}

/// Map a non-success status to the error taxonomy
fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let code = status.as_u16();
    let message = serde_json::from_str::<ChatApiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}", code));

    match code {
        429 => GatewayError::RateLimited,
        500.. => GatewayError::ServerError {
            status: code,
            message,
        },
        _ => GatewayError::ClientRejected {
            status: code,
            message,
        },
    }
}

/// Content and reasoning trace of the first choice
fn parse_reply(body: &str) -> Result<ModelReply, GatewayError> {
    let parsed: ChatApiResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("Invalid JSON: {}", e)))?;

    if let Some(error) = parsed.error {
        return Err(GatewayError::InvalidResponse(
            error.message.unwrap_or_else(|| "Provider error".to_string()),
        ));
    }

    let message = parsed
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".to_string()))?;

    let reply = ModelReply::new(message.content.unwrap_or_default());
    Ok(match message.reasoning_details {
        Some(details) if !details.is_null() => reply.with_reasoning(details),
        _ => reply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            GatewayError::RateLimited
        );
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down"),
            GatewayError::ServerError { status: 502, .. }
        ));

        let body = json!({"error": {"message": "No auth credentials found", "code": 401}});
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, &body.to_string()),
            GatewayError::ClientRejected {
                status: 401,
                message: "No auth credentials found".to_string()
            }
        );
    }

    #[test]
    fn test_parse_reply_with_reasoning() {
        let body = json!({
            "choices": [{"message": {
                "content": "42",
                "reasoning_details": [{"type": "reasoning.text", "text": "6 * 7"}]
            }}]
        });
        let reply = parse_reply(&body.to_string()).unwrap();
        assert_eq!(reply.content, "42");
        assert_eq!(reply.reasoning.unwrap()[0]["text"], "6 * 7");
    }

    #[test]
    fn test_parse_reply_null_content_and_reasoning() {
        let body = json!({"choices": [{"message": {"content": null, "reasoning_details": null}}]});
        let reply = parse_reply(&body.to_string()).unwrap();
        assert_eq!(reply, ModelReply::new(""));
    }

    #[test]
    fn test_parse_reply_errors() {
        assert!(matches!(
            parse_reply("not json"),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert_eq!(
            parse_reply(r#"{"choices": []}"#),
            Err(GatewayError::InvalidResponse(
                "No choices in response".to_string()
            ))
        );
        assert_eq!(
            parse_reply(r#"{"error": {"message": "moderation"}}"#),
            Err(GatewayError::InvalidResponse("moderation".to_string()))
        );
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            OpenRouterGateway::new("  "),
            Err(OpenRouterError::MissingApiKey)
        ));
    }
}
