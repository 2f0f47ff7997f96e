//! Wired services and command dispatch

use anyhow::{Context, Result, anyhow, bail};
use council_application::{
    AnalyticsService, CompareStrategiesUseCase, ConversationStore, NoProgress, ProgressNotifier,
    RecommendStrategyUseCase, RecordFeedbackUseCase, ResilientClient, RunCouncilInput,
    RunCouncilUseCase, list_strategies,
};
use council_domain::{Model, Question, StrategyKind};
use council_infrastructure::{
    FileConfig, JsonConversationStore, JsonSnapshotStore, OpenRouterGateway,
};
use council_presentation::{
    AnalyticsCommand, Command, ConversationsCommand, OutputFormat, OutputFormatter,
    ProgressReporter, SimpleProgress, formatter_for,
};
use serde_json::Value;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

pub struct App {
    config: FileConfig,
    conversations: Arc<dyn ConversationStore>,
    analytics: Arc<AnalyticsService>,
    output: OutputFormat,
    formatter: Box<dyn OutputFormatter>,
    quiet: bool,
}

impl App {
    pub fn new(config: FileConfig, output: OutputFormat, quiet: bool) -> Self {
        // === Dependency Injection ===
        let conversations: Arc<dyn ConversationStore> = Arc::new(JsonConversationStore::new(
            config.storage.conversations_dir(),
        ));
        let snapshots = Arc::new(JsonSnapshotStore::new(config.storage.snapshot_path()));
        let analytics = Arc::new(
            AnalyticsService::new(conversations.clone(), snapshots)
                .with_ttl(config.storage.analytics_ttl()),
        );

        Self {
            config,
            conversations,
            analytics,
            output,
            formatter: formatter_for(output),
            quiet,
        }
    }

    pub async fn run(&self, command: Command, cancel: &CancellationToken) -> Result<()> {
        match command {
            Command::Strategies => {
                print!("{}", self.formatter.format_strategies(&list_strategies()));
            }
            Command::Recommend { query } => {
                let recommendation = RecommendStrategyUseCase::new()
                    .with_analytics(self.analytics.clone())
                    .execute(&query)
                    .await;
                print!("{}", self.formatter.format_recommendation(&recommendation));
            }
            Command::Compare { query, strategies } => {
                self.compare(query, &strategies, cancel).await?;
            }
            Command::Ask {
                query,
                conversation,
                strategy,
                strategy_config,
            } => {
                self.ask(query, conversation, strategy, strategy_config, cancel)
                    .await?;
            }
            Command::Conversations(command) => self.run_conversations(command).await?,
            Command::Analytics(command) => self.run_analytics(command).await?,
            Command::Feedback {
                conversation,
                index,
                value,
            } => {
                let feedback = RecordFeedbackUseCase::new(self.conversations.clone())
                    .with_analytics(self.analytics.clone())
                    .execute(&conversation, index, value)
                    .await?;
                print!(
                    "{}",
                    self.formatter.format_feedback(&conversation, index, feedback)
                );
            }
            Command::Config => {
                println!("{}", effective_config(&self.config)?);
            }
        }
        Ok(())
    }

    /// Model client over OpenRouter; only commands that query models need a key
    fn client(&self) -> Result<ResilientClient> {
        let provider = &self.config.provider;
        let api_key = provider.resolve_api_key().unwrap_or_default();
        let gateway =
            OpenRouterGateway::with_config(&api_key, &provider.base_url, provider.timeout())?;
        Ok(ResilientClient::new(Arc::new(gateway), provider.retry_policy()))
    }

    fn progress(&self) -> Box<dyn ProgressNotifier> {
        if self.quiet || self.output == OutputFormat::Json {
            Box::new(NoProgress)
        } else if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        }
    }

    async fn ask(
        &self,
        query: String,
        conversation: Option<String>,
        strategy: Option<String>,
        strategy_config: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let question = Question::try_from(query)?;
        let client = self.client()?;

        let conversation_id = match conversation {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                self.conversations.create(&id).await?;
                info!("Created conversation {}", id);
                id
            }
        };

        let strategy =
            strategy.unwrap_or_else(|| self.config.default_strategy().as_str().to_string());
        let overrides = match strategy_config {
            Some(raw) => Some(
                serde_json::from_str::<Value>(&raw)
                    .context("--strategy-config must be a JSON object")?,
            ),
            None => strategy
                .parse::<StrategyKind>()
                .ok()
                .and_then(|kind| self.config.strategies.overrides(kind)),
        };

        let mut input =
            RunCouncilInput::new(conversation_id.clone(), question).with_strategy(strategy);
        if let Some(overrides) = overrides {
            input = input.with_strategy_config(overrides);
        }

        let use_case = RunCouncilUseCase::new(
            client,
            self.conversations.clone(),
            self.config.council.to_params(),
        )
        .with_performance(self.analytics.clone());
        let progress = self.progress();
        let output = use_case
            .execute_with_progress(input, progress.as_ref(), cancel)
            .await?;

        print!(
            "{}",
            self.formatter
                .format_result(&output.result, output.title.as_deref())
        );

        if self.output != OutputFormat::Json
            && let Some(conversation) = self.conversations.get(&conversation_id).await?
        {
            eprintln!(
                "\nRate this answer: llm-council feedback {} {} <-1|0|1>",
                conversation_id,
                conversation.messages.len().saturating_sub(1)
            );
        }
        Ok(())
    }

    async fn compare(
        &self,
        query: String,
        strategies: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let question = Question::try_from(query)?;
        let use_case =
            CompareStrategiesUseCase::new(self.client()?, self.config.council.to_params())
                .with_performance(self.analytics.clone());

        let runs = use_case.execute(&question, strategies, cancel).await?;
        if cancel.is_cancelled() {
            bail!("Comparison cancelled");
        }
        print!(
            "{}",
            self.formatter.format_comparison(question.content(), &runs)
        );
        Ok(())
    }

    async fn run_conversations(&self, command: ConversationsCommand) -> Result<()> {
        match command {
            ConversationsCommand::List => {
                let conversations = self.conversations.list().await?;
                print!("{}", self.formatter.format_conversation_list(&conversations));
            }
            ConversationsCommand::Show { id } => {
                let conversation = self
                    .conversations
                    .get(&id)
                    .await?
                    .ok_or_else(|| anyhow!("Conversation {} not found", id))?;
                print!("{}", self.formatter.format_conversation(&conversation));
            }
            ConversationsCommand::New => {
                let id = Uuid::new_v4().to_string();
                let conversation = self.conversations.create(&id).await?;
                print!(
                    "{}",
                    self.formatter.format_conversation_list(&[conversation.meta()])
                );
            }
        }
        Ok(())
    }

    async fn run_analytics(&self, command: AnalyticsCommand) -> Result<()> {
        match command {
            AnalyticsCommand::Summary { refresh } => {
                let summary = if refresh {
                    self.analytics.recompute().await?
                } else {
                    self.analytics.summary().await?
                };
                print!("{}", self.formatter.format_summary(&summary));
            }
            AnalyticsCommand::Leaderboard { limit } => {
                let entries = self.analytics.leaderboard(limit).await?;
                print!("{}", self.formatter.format_leaderboard(&entries));
            }
            AnalyticsCommand::Model { model } => {
                let model = Model::from(model.as_str());
                let stats = self.analytics.model_performance(&model).await?;
                print!(
                    "{}",
                    self.formatter.format_model_stats(&model, stats.as_ref())
                );
            }
            AnalyticsCommand::Strategy { strategy } => {
                let stats = self.analytics.strategy_performance(&strategy).await?;
                print!(
                    "{}",
                    self.formatter
                        .format_strategy_stats(&strategy, stats.as_ref())
                );
            }
        }
        Ok(())
    }
}

/// Effective configuration as TOML, with the API key masked
pub fn effective_config(config: &FileConfig) -> Result<String> {
    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some("********".to_string());
    }
    toml::to_string_pretty(&shown).context("Failed to render configuration")
}
