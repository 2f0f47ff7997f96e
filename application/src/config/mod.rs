//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`RetryPolicy`]: per-call timeout and retry/backoff control
//! - [`CouncilParams`]: which models sit on the council

pub mod council_params;
pub mod retry_policy;

pub use council_params::CouncilParams;
pub use retry_policy::RetryPolicy;
