//! Aggregation of per-critic orderings into per-candidate scores.
//!
//! A candidate's score is the mean of its 1-indexed positions across the
//! critiques that mention it. Candidates no critic mentions are left out of
//! the aggregate entirely. Lower is better.
//!
//! Positions are counted over a ballot's known labels only, first mention
//! wins, so a mean rank always lies in `1..=N` for N candidates.
//!
//! The weighted variant scales each critic's vote by a reliability weight:
//! `Σ(position × w) / Σw`. With equal weights both variants agree.

use super::label::{Label, LabelMap};
use crate::core::model::Model;
use crate::core::string::round_to;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Weight applied to a critic missing from the weight table.
pub const NEUTRAL_WEIGHT: f64 = 0.5;

/// One candidate's aggregated standing in a ranking stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub model: Model,
    /// Mean (or weighted mean) position, rounded to 2 decimals
    pub mean_rank: f64,
    /// Number of votes contributing to the mean
    pub sample_count: usize,
    /// Sum of critic weights (weighted aggregation only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
}

/// One critic's parsed ordering
#[derive(Debug, Clone, Copy)]
pub struct Ballot<'a> {
    pub critic: &'a Model,
    pub order: &'a [Label],
}

impl<'a> Ballot<'a> {
    pub fn new(critic: &'a Model, order: &'a [Label]) -> Self {
        Self { critic, order }
    }
}

/// Distinct known candidates of a ballot with their 1-indexed positions.
fn positions<'a>(
    ballot: &Ballot<'_>,
    labels: &'a LabelMap,
) -> impl Iterator<Item = (usize, &'a Model)> {
    let mut seen = HashSet::new();
    ballot
        .order
        .iter()
        .filter(|label| seen.insert(**label))
        .filter_map(|label| labels.model_for(*label))
        .collect::<Vec<_>>()
        .into_iter()
        .enumerate()
        .map(|(idx, model)| (idx + 1, model))
}

/// Running totals for one candidate, finalized into an [`AggregateScore`]
#[derive(Debug, Default)]
struct Tally {
    weighted_sum: f64,
    weight: f64,
    votes: usize,
}

/// Candidate tallies in first-mention order
#[derive(Debug, Default)]
struct Tallies {
    order: Vec<Model>,
    by_model: HashMap<Model, Tally>,
}

impl Tallies {
    fn entry(&mut self, model: &Model) -> &mut Tally {
        if !self.by_model.contains_key(model) {
            self.order.push(model.clone());
        }
        self.by_model.entry(model.clone()).or_default()
    }

    fn finish(mut self, weighted: bool) -> Vec<AggregateScore> {
        let mut scores: Vec<AggregateScore> = self
            .order
            .into_iter()
            .filter_map(|model| {
                let tally = self.by_model.remove(&model)?;
                (tally.weight > 0.0).then(|| AggregateScore {
                    mean_rank: round_to(tally.weighted_sum / tally.weight, 2),
                    sample_count: tally.votes,
                    total_weight: weighted.then(|| round_to(tally.weight, 2)),
                    model,
                })
            })
            .collect();

        // Stable: equal means keep first-mention order
        scores.sort_by(|a, b| a.mean_rank.total_cmp(&b.mean_rank));
        scores
    }
}

/// Unweighted mean rank per candidate.
///
/// Labels outside `labels` are ignored and repeated mentions count once.
pub fn aggregate<'a>(
    ballots: impl IntoIterator<Item = Ballot<'a>>,
    labels: &LabelMap,
) -> Vec<AggregateScore> {
    let mut tallies = Tallies::default();

    for ballot in ballots {
        for (position, model) in positions(&ballot, labels) {
            let tally = tallies.entry(model);
            tally.weighted_sum += position as f64;
            tally.weight += 1.0;
            tally.votes += 1;
        }
    }

    tallies.finish(false)
}

/// Weighted mean rank per candidate.
///
/// Critics absent from `weights` vote with [`NEUTRAL_WEIGHT`].
pub fn aggregate_weighted<'a>(
    ballots: impl IntoIterator<Item = Ballot<'a>>,
    labels: &LabelMap,
    weights: &HashMap<Model, f64>,
) -> Vec<AggregateScore> {
    let mut tallies = Tallies::default();

    for ballot in ballots {
        let weight = weights
            .get(ballot.critic)
            .copied()
            .unwrap_or(NEUTRAL_WEIGHT);

        for (position, model) in positions(&ballot, labels) {
            let tally = tallies.entry(model);
            tally.weighted_sum += position as f64 * weight;
            tally.weight += weight;
            tally.votes += 1;
        }
    }

    tallies.finish(true)
}
