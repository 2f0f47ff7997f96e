//! Ensemble strategies
//!
//! Every strategy runs the same stage machine
//! (Collect → Rank → (Revise → Rank)* → Synthesize) and differs in how it
//! ranks, revises and aggregates:
//!
//! - [`SimpleStrategy`]: one collection, one ranking pass, one synthesis
//! - [`MultiRoundStrategy`]: revision rounds against the previous round's best
//! - [`ReasoningAwareStrategy`]: reasoning traces and answers ranked separately
//! - [`WeightedVotingStrategy`]: critic ballots weighted by past performance
//!
//! Strategies are resolved from [`StrategyTunables`] by [`build_strategy`].

mod multi_round;
mod pipeline;
mod reasoning_aware;
mod simple;
mod weighted_voting;

pub use multi_round::MultiRoundStrategy;
pub use reasoning_aware::ReasoningAwareStrategy;
pub use simple::SimpleStrategy;
pub use weighted_voting::{PerformanceSource, WeightedVotingStrategy};

use crate::client::ResilientClient;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use async_trait::async_trait;
use council_domain::{
    ConfigSchema, DomainError, Model, Question, StrategyKind, StrategyResult, StrategyTunables,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while running a strategy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy run cancelled")]
    Cancelled,

    #[error(transparent)]
    InvalidInput(DomainError),
}

impl StrategyError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StrategyError::Cancelled)
    }
}

impl From<DomainError> for StrategyError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Cancelled => StrategyError::Cancelled,
            other => StrategyError::InvalidInput(other),
        }
    }
}

/// Per-run collaborators handed to [`Strategy::execute`]
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub progress: &'a dyn ProgressNotifier,
    pub cancel: &'a CancellationToken,
}

impl<'a> RunContext<'a> {
    pub fn new(progress: &'a dyn ProgressNotifier, cancel: &'a CancellationToken) -> Self {
        Self { progress, cancel }
    }

    fn ensure_active(&self) -> Result<(), StrategyError> {
        if self.cancel.is_cancelled() {
            Err(StrategyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A council orchestration strategy
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Tunables this instance was built with
    fn tunables(&self) -> StrategyTunables;

    fn kind(&self) -> StrategyKind {
        self.tunables().kind()
    }

    fn name(&self) -> String {
        self.tunables().name()
    }

    fn description(&self) -> String {
        self.tunables().description()
    }

    fn config_schema(&self) -> ConfigSchema {
        self.kind().config_schema()
    }

    /// Run the full pipeline for one question.
    ///
    /// A run in which no council member answers still yields a well-formed
    /// result with an error final answer.
    async fn execute(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
        ctx: RunContext<'_>,
    ) -> Result<StrategyResult, StrategyError>;

    /// Run without progress reporting or cancellation
    async fn execute_simple(
        &self,
        question: &Question,
        models: &[Model],
        chairman: &Model,
    ) -> Result<StrategyResult, StrategyError> {
        let cancel = CancellationToken::new();
        self.execute(question, models, chairman, RunContext::new(&NoProgress, &cancel))
            .await
    }
}

/// Build a strategy from validated tunables.
///
/// `performance` feeds weighted voting; without it every critic votes with
/// weight 1.0.
pub fn build_strategy(
    tunables: StrategyTunables,
    client: ResilientClient,
    performance: Option<Arc<dyn PerformanceSource>>,
) -> Box<dyn Strategy> {
    match tunables {
        StrategyTunables::Simple => Box::new(SimpleStrategy::new(client)),
        StrategyTunables::MultiRound(config) => Box::new(MultiRoundStrategy::new(client, config)),
        StrategyTunables::ReasoningAware(config) => {
            Box::new(ReasoningAwareStrategy::new(client, config))
        }
        StrategyTunables::WeightedVoting(config) => {
            Box::new(WeightedVotingStrategy::new(client, config, performance))
        }
    }
}

/// Description of one available strategy
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub id: StrategyKind,
    pub name: String,
    pub description: String,
    pub config_schema: ConfigSchema,
}

/// Every strategy with its default name, description and tunable schema
pub fn list_strategies() -> Vec<StrategyInfo> {
    StrategyKind::ALL
        .iter()
        .map(|&kind| {
            let defaults = StrategyTunables::defaults(kind);
            StrategyInfo {
                id: kind,
                name: defaults.name(),
                description: defaults.description(),
                config_schema: kind.config_schema(),
            }
        })
        .collect()
}
