//! Compare Strategies use case
//!
//! Runs several strategies on the same question side by side. Nothing is
//! persisted; the comparison is for inspection only.

use crate::client::ResilientClient;
use crate::config::CouncilParams;
use crate::ports::progress::NoProgress;
use crate::strategies::{PerformanceSource, RunContext, StrategyError, build_strategy};
use council_domain::{DomainError, Question, StrategyKind, StrategyResult, StrategyTunables};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Outcome of one strategy in a comparison
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub strategy: StrategyKind,
    pub outcome: Result<StrategyResult, StrategyError>,
}

pub struct CompareStrategiesUseCase {
    client: ResilientClient,
    performance: Option<Arc<dyn PerformanceSource>>,
    params: CouncilParams,
}

impl CompareStrategiesUseCase {
    pub fn new(client: ResilientClient, params: CouncilParams) -> Self {
        Self {
            client,
            performance: None,
            params,
        }
    }

    pub fn with_performance(mut self, source: Arc<dyn PerformanceSource>) -> Self {
        self.performance = Some(source);
        self
    }

    /// Run every named strategy (default tunables) concurrently.
    ///
    /// Names are validated up front; runs are reported in request order.
    pub async fn execute(
        &self,
        question: &Question,
        strategies: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<StrategyRun>, DomainError> {
        let kinds = strategies
            .iter()
            .map(|name| name.parse::<StrategyKind>())
            .collect::<Result<Vec<_>, _>>()?;
        self.params.validate()?;
        info!("Comparing {} strategies", kinds.len());

        let runs = kinds.into_iter().map(|kind| async move {
            let strategy = build_strategy(
                StrategyTunables::defaults(kind),
                self.client.clone(),
                self.performance.clone(),
            );
            let outcome = strategy
                .execute(
                    question,
                    &self.params.council,
                    &self.params.chairman,
                    RunContext::new(&NoProgress, cancel),
                )
                .await;
            StrategyRun {
                strategy: kind,
                outcome,
            }
        });

        Ok(join_all(runs).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::test_support::{ScriptedGateway, council_responder};
    use council_domain::Model;
    use std::time::Duration;

    fn use_case(gateway: Arc<ScriptedGateway>) -> CompareStrategiesUseCase {
        let policy = RetryPolicy::default().with_base_delay(Duration::ZERO);
        CompareStrategiesUseCase::new(
            ResilientClient::new(gateway, policy),
            CouncilParams::new(
                vec![Model::from("test/a"), Model::from("test/b")],
                Model::from("test/chair"),
            ),
        )
    }

    #[tokio::test]
    async fn test_runs_each_strategy_in_request_order() {
        let gateway = Arc::new(ScriptedGateway::new().with_responder(council_responder(&[])));
        let question = Question::try_new("Tabs or spaces?").unwrap();

        let runs = use_case(gateway.clone())
            .execute(
                &question,
                &["multi_round".to_string(), "simple".to_string()],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let kinds: Vec<StrategyKind> = runs.iter().map(|r| r.strategy).collect();
        assert_eq!(kinds, vec![StrategyKind::MultiRound, StrategyKind::Simple]);
        assert!(runs.iter().all(|r| r.outcome.is_ok()));
        // two chairman calls, one per strategy
        assert_eq!(gateway.call_count("test/chair"), 2);
    }

    #[tokio::test]
    async fn test_unknown_name_fails_before_any_call() {
        let gateway = Arc::new(ScriptedGateway::new());
        let question = Question::try_new("Tabs or spaces?").unwrap();

        let err = use_case(gateway.clone())
            .execute(
                &question,
                &["simple".to_string(), "majority".to_string()],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UnknownStrategy { .. }));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_reaches_every_run() {
        let gateway = Arc::new(ScriptedGateway::new().with_responder(council_responder(&[])));
        let question = Question::try_new("Tabs or spaces?").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let runs = use_case(gateway)
            .execute(
                &question,
                &["simple".to_string(), "weighted_voting".to_string()],
                &cancel,
            )
            .await
            .unwrap();
        assert!(
            runs.iter()
                .all(|r| matches!(&r.outcome, Err(e) if e.is_cancelled()))
        );
    }
}
