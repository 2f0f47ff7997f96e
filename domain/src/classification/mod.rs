//! Query classification
//!
//! Assigns a query to one of five [`QueryCategory`] values so the
//! recommender can start from a category-specific strategy preference.

pub mod category;
pub mod classifier;

pub use category::QueryCategory;
pub use classifier::{Classification, QueryClassifier, StrategySuggestion};
