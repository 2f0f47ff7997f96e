//! Performance analytics over the conversation history
//!
//! The service reads through a two-tier cache (memory, then the durable
//! snapshot) before falling back to a full scan of the store.

mod service;

pub use service::{AnalyticsError, AnalyticsService, DEFAULT_CACHE_TTL};
