//! How standings moved between consecutive rounds of a multi-round run.

use super::value_objects::RoundRecord;
use crate::core::model::Model;
use crate::core::string::round_to;
use crate::ranking::AggregateScore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean-rank movement must exceed this to count as significant.
pub const SIGNIFICANT_CHANGE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Mean rank went down (better)
    Improved,
    Worsened,
}

/// A significant movement of one model between two rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChange {
    pub model: Model,
    /// Previous mean rank minus current (positive is better), 2 decimals
    pub change: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    pub rounds: usize,
    /// One entry per consecutive round pair
    #[serde(default)]
    pub rank_changes: Vec<Vec<RankChange>>,
    pub evolution_detected: bool,
}

impl EvolutionMetrics {
    pub fn from_rounds(rounds: &[RoundRecord]) -> Self {
        Self::from_aggregates(rounds.iter().map(|r| r.aggregate.as_slice()))
    }

    /// Compare each round's aggregate with the one before it.
    ///
    /// Only models ranked in both rounds are compared.
    pub fn from_aggregates<'a>(aggregates: impl IntoIterator<Item = &'a [AggregateScore]>) -> Self {
        let aggregates: Vec<&[AggregateScore]> = aggregates.into_iter().collect();
        if aggregates.len() < 2 {
            return Self {
                rounds: aggregates.len().max(1),
                rank_changes: Vec::new(),
                evolution_detected: false,
            };
        }

        let rank_changes: Vec<Vec<RankChange>> = aggregates
            .windows(2)
            .map(|pair| {
                let previous: HashMap<&Model, f64> =
                    pair[0].iter().map(|s| (&s.model, s.mean_rank)).collect();

                pair[1]
                    .iter()
                    .filter_map(|current| {
                        let change = previous.get(&current.model)? - current.mean_rank;
                        (change.abs() > SIGNIFICANT_CHANGE).then(|| RankChange {
                            model: current.model.clone(),
                            change: round_to(change, 2),
                            direction: if change > 0.0 {
                                Direction::Improved
                            } else {
                                Direction::Worsened
                            },
                        })
                    })
                    .collect()
            })
            .collect();

        Self {
            rounds: aggregates.len(),
            evolution_detected: rank_changes.iter().any(|changes| !changes.is_empty()),
            rank_changes,
        }
    }
}
