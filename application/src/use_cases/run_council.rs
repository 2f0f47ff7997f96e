//! Run Council use case
//!
//! Runs one strategy on a question inside a stored conversation and records
//! both the question and the council's answer. The first question of a
//! conversation also names it.

use crate::client::ResilientClient;
use crate::config::CouncilParams;
use crate::ports::conversation_store::{ConversationStore, StoreError};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::strategies::{PerformanceSource, RunContext, StrategyError, build_strategy};
use chrono::Utc;
use council_domain::conversation::DEFAULT_TITLE;
use council_domain::core::string::truncate;
use council_domain::{
    AssistantMessage, ChatMessage, DomainError, PromptTemplate, Question, StrategyKind,
    StrategyResult, StrategyTunables,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Longest stored title, in bytes
const MAX_TITLE_LEN: usize = 50;

/// Errors that can occur while running the council
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error(transparent)]
    InvalidRequest(#[from] DomainError),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<StrategyError> for RunCouncilError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::Cancelled => RunCouncilError::Cancelled,
            StrategyError::InvalidInput(e) => RunCouncilError::InvalidRequest(e),
        }
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub conversation_id: String,
    pub question: Question,
    /// Strategy identifier, e.g. `multi_round`
    pub strategy: String,
    /// Tunable overrides for the strategy
    pub strategy_config: Option<Value>,
}

impl RunCouncilInput {
    pub fn new(conversation_id: impl Into<String>, question: Question) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            question,
            strategy: StrategyKind::Simple.as_str().to_string(),
            strategy_config: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    pub fn with_strategy_config(mut self, config: Value) -> Self {
        self.strategy_config = Some(config);
        self
    }
}

/// Result of a council run
#[derive(Debug, Clone)]
pub struct RunCouncilOutput {
    pub result: StrategyResult,
    /// Title given to the conversation by this run, if any
    pub title: Option<String>,
}

/// Use case for asking the council a question
pub struct RunCouncilUseCase {
    client: ResilientClient,
    conversations: Arc<dyn ConversationStore>,
    performance: Option<Arc<dyn PerformanceSource>>,
    params: CouncilParams,
}

impl RunCouncilUseCase {
    pub fn new(
        client: ResilientClient,
        conversations: Arc<dyn ConversationStore>,
        params: CouncilParams,
    ) -> Self {
        Self {
            client,
            conversations,
            performance: None,
            params,
        }
    }

    /// Historical performance used by weighted voting
    pub fn with_performance(mut self, source: Arc<dyn PerformanceSource>) -> Self {
        self.performance = Some(source);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunCouncilInput,
    ) -> Result<RunCouncilOutput, RunCouncilError> {
        let cancel = CancellationToken::new();
        self.execute_with_progress(input, &NoProgress, &cancel).await
    }

    /// Execute the use case with progress callbacks and cancellation.
    ///
    /// Nothing is written to the store unless the strategy completes.
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<RunCouncilOutput, RunCouncilError> {
        let kind: StrategyKind = input.strategy.parse()?;
        let tunables = StrategyTunables::from_json(kind, input.strategy_config.as_ref())?;
        self.params.validate()?;

        let conversation = self
            .conversations
            .get(&input.conversation_id)
            .await?
            .ok_or_else(|| RunCouncilError::ConversationNotFound(input.conversation_id.clone()))?;
        let is_first_message = conversation.is_empty();

        info!(
            "Asking the council ({}) in conversation {}",
            tunables.name(),
            input.conversation_id
        );
        let strategy = build_strategy(tunables, self.client.clone(), self.performance.clone());

        let run = strategy.execute(
            &input.question,
            &self.params.council,
            &self.params.chairman,
            RunContext::new(progress, cancel),
        );
        let title = async {
            if !is_first_message {
                return None;
            }
            tokio::select! {
                title = self.generate_title(&input.question) => Some(title),
                _ = cancel.cancelled() => None,
            }
        };
        let (result, title) = tokio::join!(run, title);
        let result = result?;

        let id = &input.conversation_id;
        self.conversations
            .add_user_message(id, input.question.content())
            .await?;
        if let Some(title) = &title {
            self.conversations.update_title(id, title).await?;
        }
        self.conversations
            .add_assistant_message(id, AssistantMessage::from_result(result.clone(), Utc::now()))
            .await?;

        Ok(RunCouncilOutput { result, title })
    }

    /// Short title for a new conversation, falling back to the default
    async fn generate_title(&self, question: &Question) -> String {
        let messages = [ChatMessage::user(PromptTemplate::title_prompt(
            question.content(),
        ))];
        match self.client.query_one(&self.params.title_model, &messages).await {
            Some(reply) => {
                let title = clean_title(&reply.content);
                debug!("Generated title: {}", title);
                title
            }
            None => {
                warn!("Title generation failed, using default title");
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

fn clean_title(raw: &str) -> String {
    let title = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        truncate(title, MAX_TITLE_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::llm_gateway::{GatewayError, ModelReply};
    use crate::test_support::{MemoryConversations, ScriptedGateway, council_responder};
    use council_domain::{Message, Model, Stage1};
    use serde_json::json;
    use std::time::Duration;

    fn params() -> CouncilParams {
        CouncilParams::new(
            vec![Model::from("test/a"), Model::from("test/b")],
            Model::from("test/chair"),
        )
        .with_title_model(Model::from("test/title"))
    }

    fn use_case(gateway: ScriptedGateway, store: Arc<MemoryConversations>) -> RunCouncilUseCase {
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        RunCouncilUseCase::new(ResilientClient::new(Arc::new(gateway), policy), store, params())
    }

    fn input(id: &str) -> RunCouncilInput {
        RunCouncilInput::new(id, Question::try_new("What is a lifetime?").unwrap())
    }

    async fn store_with(id: &str) -> Arc<MemoryConversations> {
        let store = Arc::new(MemoryConversations::default());
        store.create(id).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_first_message_is_persisted_and_titled() {
        let store = store_with("c1").await;
        let gateway = ScriptedGateway::new().with_responder(council_responder(&[]));

        let output = use_case(gateway, store.clone())
            .execute(input("c1"))
            .await
            .unwrap();

        assert_eq!(output.title.as_deref(), Some("Rust Ownership Basics"));
        let stored = store.snapshot("c1").unwrap();
        assert_eq!(stored.title, "Rust Ownership Basics");
        assert_eq!(stored.messages.len(), 2);
        assert!(matches!(
            &stored.messages[0],
            Message::User { content } if content == "What is a lifetime?"
        ));
        let answer = stored.messages[1].as_assistant().unwrap();
        assert_eq!(answer.strategy(), Some(StrategyKind::Simple));
        assert_eq!(answer.stage3.content, "Synthesis by test/chair");
        assert!(answer.feedback.is_none());
    }

    #[tokio::test]
    async fn test_later_messages_keep_title() {
        let store = store_with("c1").await;
        let gateway = Arc::new(ScriptedGateway::new().with_responder(council_responder(&[])));
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        let use_case = RunCouncilUseCase::new(
            ResilientClient::new(gateway.clone(), policy),
            store.clone(),
            params(),
        );

        use_case.execute(input("c1")).await.unwrap();
        let second = use_case.execute(input("c1")).await.unwrap();

        assert!(second.title.is_none());
        assert_eq!(gateway.call_count("test/title"), 1);
        assert_eq!(store.snapshot("c1").unwrap().messages.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_title_falls_back_to_default() {
        let store = store_with("c1").await;
        let gateway = ScriptedGateway::new()
            .push(
                "test/title",
                Err(GatewayError::ClientRejected {
                    status: 404,
                    message: "no such model".into(),
                }),
            )
            .with_responder(council_responder(&[]));

        let output = use_case(gateway, store).execute(input("c1")).await.unwrap();
        assert_eq!(output.title.as_deref(), Some(DEFAULT_TITLE));
    }

    #[tokio::test]
    async fn test_strategy_config_is_applied() {
        let store = store_with("c1").await;
        let gateway = ScriptedGateway::new().with_responder(council_responder(&[]));

        let output = use_case(gateway, store)
            .execute(
                input("c1")
                    .with_strategy("multi_round")
                    .with_strategy_config(json!({"rounds": 3})),
            )
            .await
            .unwrap();
        assert_eq!(output.result.metadata.strategy, StrategyKind::MultiRound);
        assert!(matches!(&output.result.stage1, Stage1::Rounds(r) if r.len() == 3));
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_rejected() {
        let store = store_with("c1").await;
        let err = use_case(ScriptedGateway::new(), store.clone())
            .execute(input("c1").with_strategy("best"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunCouncilError::InvalidRequest(DomainError::UnknownStrategy { .. })
        ));
        assert!(store.snapshot("c1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_tunable_is_rejected() {
        let store = store_with("c1").await;
        let err = use_case(ScriptedGateway::new(), store)
            .execute(
                input("c1")
                    .with_strategy("multi_round")
                    .with_strategy_config(json!({"rounds": 9})),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunCouncilError::InvalidRequest(DomainError::InvalidParameter { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_conversation() {
        let store = Arc::new(MemoryConversations::default());
        let err = use_case(ScriptedGateway::new(), store)
            .execute(input("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunCouncilError::ConversationNotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_cancelled_run_persists_nothing() {
        let store = store_with("c1").await;
        let gateway = ScriptedGateway::new().with_responder(council_responder(&[]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = use_case(gateway, store.clone())
            .execute_with_progress(input("c1"), &NoProgress, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, RunCouncilError::Cancelled));
        let stored = store.snapshot("c1").unwrap();
        assert!(stored.is_empty());
        assert_eq!(stored.title, DEFAULT_TITLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_does_not_wait_for_title() {
        let store = store_with("c1").await;
        let gateway = ScriptedGateway::new()
            .with_delay("test/a", Duration::from_secs(30))
            .with_delay("test/b", Duration::from_secs(30))
            .with_delay("test/title", Duration::from_secs(100))
            .with_responder(council_responder(&[]));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let err = use_case(gateway, store.clone())
            .execute_with_progress(input("c1"), &NoProgress, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, RunCouncilError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(store.snapshot("c1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_failed_run_is_still_recorded() {
        let store = store_with("c1").await;
        let rejected = || {
            Err(GatewayError::ClientRejected {
                status: 401,
                message: "bad key".into(),
            })
        };
        let gateway = ScriptedGateway::new()
            .push("test/a", rejected())
            .push("test/b", rejected())
            .push("test/title", Ok(ModelReply::new("Lifetimes")));

        let output = use_case(gateway, store.clone())
            .execute(input("c1"))
            .await
            .unwrap();
        assert!(output.result.is_error());
        let stored = store.snapshot("c1").unwrap();
        assert!(stored.messages[1].as_assistant().unwrap().stage3.is_error);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  \"Borrowing Rules\"\n"), "Borrowing Rules");
        assert_eq!(clean_title("''"), DEFAULT_TITLE);
        let long = clean_title(&"word ".repeat(20));
        assert!(long.len() <= MAX_TITLE_LEN);
        assert!(long.ends_with("..."));
    }
}
