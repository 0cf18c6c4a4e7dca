//! Achievement badges derived from garden aggregates

pub mod catalogue;
pub mod evaluator;

pub use catalogue::{Badge, BadgeThresholds};
pub use evaluator::{BadgeAward, BadgeEvaluator};
