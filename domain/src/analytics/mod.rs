//! Performance analytics over stored conversations
//!
//! - [`stats`]: finalized per-model and per-strategy records
//! - [`accumulator`]: the history scan that builds them

pub mod accumulator;
pub mod stats;

pub use accumulator::PerformanceAccumulator;
pub use stats::{
    LeaderboardEntry, ModelStats, PerformanceSummary, StrategyBreakdown, StrategyStats,
    UNKNOWN_STRATEGY,
};
