//! Record Feedback use case
//!
//! Stores a user rating on an assistant message and drops cached analytics
//! so the rating counts on the next read.

use crate::analytics::AnalyticsService;
use crate::ports::conversation_store::{ConversationStore, StoreError};
use chrono::Utc;
use council_domain::{DomainError, Feedback};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error(transparent)]
    InvalidValue(#[from] DomainError),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for FeedbackError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => FeedbackError::ConversationNotFound(id),
            other => FeedbackError::Store(other),
        }
    }
}

pub struct RecordFeedbackUseCase {
    conversations: Arc<dyn ConversationStore>,
    analytics: Option<Arc<AnalyticsService>>,
}

impl RecordFeedbackUseCase {
    pub fn new(conversations: Arc<dyn ConversationStore>) -> Self {
        Self {
            conversations,
            analytics: None,
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<AnalyticsService>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Rate message `message_index` of a conversation with -1, 0 or 1
    pub async fn execute(
        &self,
        conversation_id: &str,
        message_index: usize,
        value: i64,
    ) -> Result<Feedback, FeedbackError> {
        let feedback = Feedback::try_from(value)?;
        self.conversations
            .update_feedback(conversation_id, message_index, feedback, Utc::now())
            .await?;
        info!(
            "Recorded feedback {} on message {} of {}",
            value, message_index, conversation_id
        );

        if let Some(analytics) = &self.analytics {
            analytics.invalidate().await;
        }
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryConversations, MemorySnapshots, answered_conversation};
    use council_domain::{FeedbackTargetError, StrategyKind};

    fn store() -> Arc<MemoryConversations> {
        let store = Arc::new(MemoryConversations::default());
        store.insert(answered_conversation(
            "c1",
            StrategyKind::Simple,
            &["test/a"],
            None,
        ));
        store
    }

    #[tokio::test]
    async fn test_records_feedback_and_refreshes_analytics() {
        let store = store();
        let analytics = Arc::new(AnalyticsService::new(
            store.clone(),
            Arc::new(MemorySnapshots::default()),
        ));
        assert_eq!(
            analytics.summary().await.unwrap().strategy("simple").unwrap().avg_feedback,
            None
        );

        let feedback = RecordFeedbackUseCase::new(store.clone())
            .with_analytics(analytics.clone())
            .execute("c1", 1, 1)
            .await
            .unwrap();

        assert_eq!(feedback, Feedback::Like);
        let answer = store.snapshot("c1").unwrap().messages[1]
            .as_assistant()
            .cloned()
            .unwrap();
        assert_eq!(answer.feedback, Some(Feedback::Like));
        assert!(answer.feedback_timestamp.is_some());
        assert_eq!(
            analytics.summary().await.unwrap().strategy("simple").unwrap().avg_feedback,
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_value() {
        let err = RecordFeedbackUseCase::new(store())
            .execute("c1", 1, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidValue(DomainError::InvalidFeedback(2))));
    }

    #[tokio::test]
    async fn test_rejects_user_message_and_bad_index() {
        let use_case = RecordFeedbackUseCase::new(store());

        let err = use_case.execute("c1", 0, 1).await.unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Store(StoreError::InvalidTarget(FeedbackTargetError::NotAssistant(0)))
        ));

        let err = use_case.execute("c1", 5, 1).await.unwrap_err();
        assert!(err.to_string().contains("Invalid message index: 5"));
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let err = RecordFeedbackUseCase::new(store())
            .execute("missing", 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::ConversationNotFound(id) if id == "missing"));
    }
}
