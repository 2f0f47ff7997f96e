//! Resilient model client
//!
//! Wraps an [`LlmGateway`] with a per-attempt timeout and bounded retries,
//! and fans requests out to many models at once. Failures never surface as
//! errors: a model that could not answer is reported as `None`.

use crate::config::RetryPolicy;
use crate::ports::llm_gateway::{GatewayError, LlmGateway, ModelReply, RetryClass};
use crate::ports::progress::ProgressNotifier;
use council_domain::{ChatMessage, DomainError, Model, Stage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One model call in a fan-out batch
pub type BatchRequest = (Model, Vec<ChatMessage>);

/// Outcome of one model call, `None` when the model gave no answer
pub type BatchReply = (Model, Option<ModelReply>);

#[derive(Clone)]
pub struct ResilientClient {
    gateway: Arc<dyn LlmGateway>,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(gateway: Arc<dyn LlmGateway>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Query one model, retrying transient failures.
    pub async fn query_one(&self, model: &Model, messages: &[ChatMessage]) -> Option<ModelReply> {
        let attempts = self.policy.max_retries.max(1);

        for attempt in 0..attempts {
            let err = match self.attempt(model, messages).await {
                Ok(reply) => return Some(reply),
                Err(e) => e,
            };

            let delay = match err.retry_class() {
                RetryClass::Permanent => {
                    warn!("Model {} failed: {}", model, err);
                    return None;
                }
                RetryClass::Transient => self.policy.transient_backoff(attempt),
                RetryClass::RateLimited => self.policy.rate_limit_backoff(attempt),
            };

            if attempt + 1 >= attempts {
                warn!(
                    "Model {} failed after {} attempts: {}",
                    model, attempts, err
                );
                return None;
            }

            debug!(
                "Model {} attempt {}/{} failed ({}), retrying in {:?}",
                model,
                attempt + 1,
                attempts,
                err,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        None
    }

    /// Query several models with the same messages.
    ///
    /// Returns one entry per distinct requested model, in first-request order.
    pub async fn query_many(&self, models: &[Model], messages: &[ChatMessage]) -> Vec<BatchReply> {
        let mut seen = HashSet::new();
        let requests = models
            .iter()
            .filter(|m| seen.insert(*m))
            .map(|m| (m.clone(), messages.to_vec()))
            .collect();
        let never = CancellationToken::new();
        self.query_batch(requests, None, &never)
            .await
            .unwrap_or_default()
    }

    /// Run every request concurrently, reporting each completion.
    ///
    /// Results come back in request order regardless of completion order,
    /// one per request; a call whose task died counts as no answer.
    /// Cancelling `cancel` aborts the outstanding calls.
    pub async fn query_batch(
        &self,
        requests: Vec<BatchRequest>,
        progress: Option<(&Stage, &dyn ProgressNotifier)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<BatchReply>, DomainError> {
        let models: Vec<Model> = requests.iter().map(|(m, _)| m.clone()).collect();
        let mut slots: Vec<Option<ModelReply>> = vec![None; models.len()];
        let mut task_slots = HashMap::new();
        let mut join_set = JoinSet::new();

        for (idx, (model, messages)) in requests.into_iter().enumerate() {
            let client = self.clone();
            let handle = join_set.spawn(async move {
                let reply = client.query_one(&model, &messages).await;
                (idx, reply)
            });
            task_slots.insert(handle.id(), idx);
        }

        loop {
            let joined = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancelled with {} calls outstanding", join_set.len());
                    join_set.abort_all();
                    return Err(DomainError::Cancelled);
                }
                joined = join_set.join_next() => joined,
            };

            let Some(result) = joined else { break };
            let (idx, reply) = match result {
                Ok(done) => done,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    match task_slots.get(&e.id()) {
                        Some(idx) => (*idx, None),
                        None => continue,
                    }
                }
            };
            if let Some((stage, notifier)) = progress {
                notifier.on_task_complete(stage, &models[idx], reply.is_some());
            }
            slots[idx] = reply;
        }

        Ok(models.into_iter().zip(slots).collect())
    }

    async fn attempt(
        &self,
        model: &Model,
        messages: &[ChatMessage],
    ) -> Result<ModelReply, GatewayError> {
        let call = self.gateway.complete(model, messages);
        match tokio::time::timeout(self.policy.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        }
    }
}
