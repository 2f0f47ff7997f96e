//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod openrouter;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileProviderConfig,
    FileStorageConfig, FileStrategiesConfig,
};
pub use openrouter::{OpenRouterError, OpenRouterGateway};
pub use storage::{JsonConversationStore, JsonSnapshotStore};
