//! Chat messages exchanged with model backends

pub mod message;

pub use message::{ChatMessage, Role};
