//! Conversation store port
//!
//! Persistence for conversations and their messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_domain::{AssistantMessage, Conversation, ConversationMeta, Feedback};
use thiserror::Error;

/// Errors from a conversation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Invalid feedback target: {0}")]
    InvalidTarget(#[from] council_domain::FeedbackTargetError),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Store of conversations
///
/// Each write operation is atomic at the conversation level.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation
    async fn create(&self, id: &str) -> Result<Conversation, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError>;

    /// Metadata of every conversation, newest first
    async fn list(&self) -> Result<Vec<ConversationMeta>, StoreError>;

    /// Every readable conversation plus the number that failed to load
    async fn load_all(&self) -> Result<(Vec<Conversation>, usize), StoreError>;

    async fn add_user_message(&self, id: &str, content: &str) -> Result<(), StoreError>;

    async fn add_assistant_message(
        &self,
        id: &str,
        message: AssistantMessage,
    ) -> Result<(), StoreError>;

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError>;

    /// Record feedback on the assistant message at `message_index`
    async fn update_feedback(
        &self,
        id: &str,
        message_index: usize,
        feedback: Feedback,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
