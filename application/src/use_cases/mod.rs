//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod compare_strategies;
pub mod record_feedback;
pub mod recommend_strategy;
pub mod run_council;
