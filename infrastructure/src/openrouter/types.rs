//! Wire types for the chat-completions endpoint

use council_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub(super) struct ChatApiRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
pub(super) struct ChatApiResponse {
    pub choices: Option<Vec<Choice>>,
    pub error: Option<ApiError>,
}

#[derive(Deserialize)]
pub(super) struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
pub(super) struct ChoiceMessage {
    pub content: Option<String>,
    /// Provider-specific reasoning trace, kept as-is
    #[serde(default)]
    pub reasoning_details: Option<Value>,
}

#[derive(Deserialize)]
pub(super) struct ApiError {
    pub message: Option<String>,
}
