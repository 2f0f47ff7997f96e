//! Anonymized peer ranking: labels, critique parsing, and aggregation.

pub mod aggregate;
pub mod label;
pub mod parsing;

pub use aggregate::{AggregateScore, Ballot, NEUTRAL_WEIGHT, aggregate, aggregate_weighted};
pub use label::{Label, LabelMap};
pub use parsing::{ParseTier, ParsedRanking, RANKING_MARKER, parse_ranking};
