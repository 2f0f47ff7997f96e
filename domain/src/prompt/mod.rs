//! Prompt domain
//!
//! Templates for every stage of a council run.

mod template;

pub use template::PromptTemplate;
