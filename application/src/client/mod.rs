//! Model client with timeouts, retries and concurrent fan-out.

mod resilient;

pub use resilient::{BatchReply, BatchRequest, ResilientClient};
