//! Explainability ranking.
//!
//! Answers "which indicators drove the regime calls" by fitting a random
//! forest to walk-forward regime labels and reading its feature importances.

mod error;
mod features;
mod forest;
mod ranker;
mod scaler;

pub use error::ExplainError;
pub use features::Feature;
pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use ranker::{
    rank_importance, FeatureImportance, ImportanceRanker, ImportanceRanking, RankerConfig,
};
pub use scaler::StandardScaler;
