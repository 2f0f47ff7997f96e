//! Conversation entities
//!
//! A conversation is an ordered list of user queries and the council's
//! answers to them. Assistant messages keep every stage of the run plus its
//! metadata, which is what performance analytics later scans.

use crate::core::error::DomainError;
use crate::orchestration::strategy::StrategyKind;
use crate::orchestration::value_objects::{
    CritiqueRecord, FinalAnswer, Stage1, StrategyMetadata, StrategyResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to conversations until one is generated.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// User rating of an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Feedback {
    Dislike,
    Neutral,
    Like,
}

impl Feedback {
    pub fn score(&self) -> i64 {
        match self {
            Feedback::Dislike => -1,
            Feedback::Neutral => 0,
            Feedback::Like => 1,
        }
    }
}

impl TryFrom<i64> for Feedback {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Feedback::Dislike),
            0 => Ok(Feedback::Neutral),
            1 => Ok(Feedback::Like),
            other => Err(DomainError::InvalidFeedback(other)),
        }
    }
}

impl From<Feedback> for i64 {
    fn from(feedback: Feedback) -> Self {
        feedback.score()
    }
}

/// The council's answer to one user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub stage1: Stage1,
    pub stage2: Vec<CritiqueRecord>,
    pub stage3: FinalAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StrategyMetadata>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_timestamp: Option<DateTime<Utc>>,
}

impl AssistantMessage {
    pub fn from_result(result: StrategyResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            stage1: result.stage1,
            stage2: result.stage2,
            stage3: result.stage3,
            metadata: Some(result.metadata),
            timestamp,
            feedback: None,
            feedback_timestamp: None,
        }
    }

    /// Strategy recorded for this answer, if any
    pub fn strategy(&self) -> Option<StrategyKind> {
        self.metadata.as_ref().map(|m| m.strategy)
    }
}

/// One entry of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User { content: String },
    Assistant(Box<AssistantMessage>),
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(message: AssistantMessage) -> Self {
        Message::Assistant(Box::new(message))
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(message) => Some(message),
            Message::User { .. } => None,
        }
    }

    pub fn as_assistant_mut(&mut self) -> Option<&mut AssistantMessage> {
        match self {
            Message::Assistant(message) => Some(message),
            Message::User { .. } => None,
        }
    }
}

/// A stored conversation (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Conversation {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            title: default_title(),
            messages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn assistant_messages(&self) -> impl Iterator<Item = &AssistantMessage> {
        self.messages.iter().filter_map(Message::as_assistant)
    }

    pub fn meta(&self) -> ConversationMeta {
        ConversationMeta {
            id: self.id.clone(),
            created_at: self.created_at,
            title: self.title.clone(),
            message_count: self.messages.len(),
        }
    }

    /// Rate the assistant message at `index`.
    pub fn set_feedback(
        &mut self,
        index: usize,
        feedback: Feedback,
        at: DateTime<Utc>,
    ) -> Result<(), FeedbackTargetError> {
        let len = self.messages.len();
        let message = self
            .messages
            .get_mut(index)
            .ok_or(FeedbackTargetError::IndexOutOfRange { index, len })?;
        let assistant = message
            .as_assistant_mut()
            .ok_or(FeedbackTargetError::NotAssistant(index))?;

        assistant.feedback = Some(feedback);
        assistant.feedback_timestamp = Some(at);
        Ok(())
    }
}

/// Why a feedback target was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackTargetError {
    #[error("Invalid message index: {index} (conversation has {len} messages)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Can only add feedback to assistant messages (message {0} is a user message)")]
    NotAssistant(usize),
}

/// Listing entry for a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub message_count: usize,
}
