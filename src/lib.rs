pub mod analysis;
pub mod config;
pub mod data;
pub mod explain;
pub mod indicators;
pub mod regime;
pub mod stats;
pub mod walkforward;

// Re-export commonly used types
pub use analysis::{analyze_market, IndicatorSummary, MarketAnalysis};
pub use config::{AnalysisConfig, ConfigError};
pub use data::{load_ohlc_csv, validate_bars, BarValidationReport, IndicatorRecord, LoaderError, OhlcBar};
pub use explain::{rank_importance, ExplainError, Feature, ImportanceRanker, ImportanceRanking, RankerConfig};
pub use indicators::compute_indicators;
pub use regime::{classify, ClassificationResult, ClassifierConfig, RegimeCategory, RegimeClassifier};
pub use walkforward::walk_forward_labels;
