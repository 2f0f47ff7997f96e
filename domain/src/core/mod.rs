//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: council members and chairmen (OpenRouter identifiers)
//! - [`question::Question`]: a validated query to pose to the council
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod question;
pub mod string;
