//! Stored conversations

pub mod entities;

pub use entities::{
    AssistantMessage, Conversation, ConversationMeta, DEFAULT_TITLE, Feedback,
    FeedbackTargetError, Message,
};
