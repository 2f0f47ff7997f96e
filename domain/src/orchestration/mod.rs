//! Council orchestration domain
//!
//! Stages, strategy descriptors and tunables, and the result types every
//! strategy produces.

pub mod entities;
pub mod evolution;
pub mod strategy;
pub mod value_objects;
