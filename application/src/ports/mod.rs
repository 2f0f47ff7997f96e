//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_store;
pub mod llm_gateway;
pub mod progress;
pub mod snapshot_store;
