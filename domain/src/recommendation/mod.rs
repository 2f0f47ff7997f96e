//! Strategy recommendation from query category and feedback history

pub mod recommender;

pub use recommender::{Recommendation, StrategyRecommender, category_preferences};
