//! Analysis configuration loaded from TOML.
//!
//! Every field is optional; missing fields take the defaults used by
//! `AnalysisConfig::default()`.
//!
//! ```toml
//! [classifier]
//! uptrend_rsi = [50.0, 70.0]
//! volatility_percentile = 75.0
//!
//! [ranker]
//! features = ["RSI", "Volatility", "MACD"]
//! min_rows = 50
//!
//! [ranker.forest]
//! n_trees = 100
//! seed = 42
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::explain::RankerConfig;
use crate::regime::ClassifierConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }
}

/// Settings for the whole analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub classifier: ClassifierConfig,
    pub ranker: RankerConfig,
}

impl AnalysisConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier.validate()?;
        self.ranker.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::Feature;
    use tempfile::TempDir;

    #[test]
    fn test_empty_toml_is_default() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AnalysisConfig::from_toml(
            r#"
            [classifier]
            volatility_percentile = 80.0

            [ranker]
            features = ["RSI", "Volatility", "Trend_20"]

            [ranker.forest]
            n_trees = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.classifier.volatility_percentile, 80.0);
        assert_eq!(config.classifier.uptrend_rsi, (50.0, 70.0));
        assert_eq!(
            config.ranker.features,
            vec![Feature::Rsi, Feature::Volatility, Feature::Trend20]
        );
        assert_eq!(config.ranker.min_rows, 50);
        assert_eq!(config.ranker.forest.n_trees, 10);
        assert_eq!(config.ranker.forest.seed, 42);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("[ranker.forest]\nn_trees = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("[classifier]\nuptrend_rsi = [70.0, 50.0]\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("[ranker]\nfeatures = [\"Bogus\"]\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis.toml");

        let mut config = AnalysisConfig::default();
        config.ranker.forest.max_depth = 6;
        config.to_file(&path).unwrap();

        assert_eq!(AnalysisConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AnalysisConfig::from_file("/nonexistent/analysis.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
