//! Indicator importance ranking.
//!
//! Two stages, kept apart so each can be tested on its own:
//!
//! 1. [`walk_forward_labels`] re-runs the regime classifier on every prefix
//!    of the cleaned indicator rows.
//! 2. A random forest is fitted on the standardized indicator values against
//!    those labels, and its impurity importances become the ranking.
//!
//! The ranking explains which indicators move with the classifier's own
//! decisions. It never changes the classification.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::data::IndicatorRecord;
use crate::regime::{RegimeCategory, RegimeClassifier};
use crate::walkforward::{label_distribution, walk_forward_labels};

use super::error::ExplainError;
use super::features::Feature;
use super::forest::{ForestConfig, RandomForest};
use super::scaler::StandardScaler;

/// Ranker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Indicator columns to rank.
    pub features: Vec<Feature>,
    /// Fewer complete rows than this yields an empty ranking.
    pub min_rows: usize,
    pub forest: ForestConfig,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            features: Feature::DEFAULT_SET.to_vec(),
            min_rows: 50,
            forest: ForestConfig::default(),
        }
    }
}

impl RankerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.features.is_empty() {
            return Err(ConfigError::invalid("ranker.features must not be empty"));
        }
        for (i, feature) in self.features.iter().enumerate() {
            if self.features[..i].contains(feature) {
                return Err(ConfigError::invalid(format!(
                    "ranker.features lists {} twice",
                    feature
                )));
            }
        }
        if self.min_rows == 0 {
            return Err(ConfigError::invalid("ranker.min_rows must be positive"));
        }
        self.forest.validate()
    }
}

/// Weight of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    pub weight: f64,
}

/// Indicator weights ordered by descending weight. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportanceRanking {
    entries: Vec<FeatureImportance>,
}

impl ImportanceRanking {
    /// Build a ranking, sorting by descending weight. Equal weights keep
    /// their input order.
    pub fn new(mut entries: Vec<FeatureImportance>) -> Self {
        entries.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureImportance> {
        self.entries.iter()
    }

    /// The `n` heaviest entries.
    pub fn top(&self, n: usize) -> &[FeatureImportance] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature == feature)
            .map(|e| e.weight)
    }
}

/// Fits the importance model for an indicator series.
#[derive(Debug, Clone, Default)]
pub struct ImportanceRanker {
    classifier: RegimeClassifier,
    config: RankerConfig,
}

impl ImportanceRanker {
    pub fn new(classifier: RegimeClassifier, config: RankerConfig) -> Self {
        Self { classifier, config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rank indicators, falling back to an empty ranking on any failure.
    pub fn rank(&self, records: &[IndicatorRecord]) -> ImportanceRanking {
        match self.try_rank(records) {
            Ok(ranking) => ranking,
            Err(ExplainError::InsufficientData { required, actual }) => {
                warn!(required, actual, "Not enough complete rows for importance ranking");
                ImportanceRanking::empty()
            }
            Err(e) => {
                warn!(error = %e, "Importance ranking failed, returning empty ranking");
                ImportanceRanking::empty()
            }
        }
    }

    /// Rank indicators, reporting why a ranking could not be built.
    pub fn try_rank(&self, records: &[IndicatorRecord]) -> Result<ImportanceRanking, ExplainError> {
        let features = &self.config.features;
        let (rows, matrix) = complete_rows(records, features);

        if rows.len() < self.config.min_rows {
            return Err(ExplainError::InsufficientData {
                required: self.config.min_rows,
                actual: rows.len(),
            });
        }

        let labels = walk_forward_labels(&rows, &self.classifier);
        debug!(distribution = ?label_distribution(&labels), "Walk-forward label distribution");

        let (_, scaled) = StandardScaler::fit_transform(&matrix)?;
        let targets: Vec<usize> = labels.iter().map(|l| l.index()).collect();
        let forest = RandomForest::fit(
            &scaled,
            &targets,
            RegimeCategory::ALL.len(),
            &self.config.forest,
        )?;

        let ranking = ImportanceRanking::new(
            features
                .iter()
                .zip(forest.feature_importances())
                .map(|(&feature, weight)| FeatureImportance { feature, weight })
                .collect(),
        );

        info!(
            rows = rows.len(),
            features = features.len(),
            trees = forest.n_trees(),
            "Fitted importance model"
        );

        Ok(ranking)
    }
}

/// Rank indicators with default classifier and ranker settings.
pub fn rank_importance(records: &[IndicatorRecord]) -> ImportanceRanking {
    ImportanceRanker::default().rank(records)
}

/// Records with every `features` value defined, and their feature rows.
///
/// The cleaned rows carry only the ranked columns plus price, so SMA slopes
/// that are not ranked are cleared and the trend rule stays silent when the
/// rows are relabelled.
fn complete_rows(
    records: &[IndicatorRecord],
    features: &[Feature],
) -> (Vec<IndicatorRecord>, Vec<Vec<f64>>) {
    let keep_trend_20 = features.contains(&Feature::Trend20);
    let keep_trend_50 = features.contains(&Feature::Trend50);

    records
        .iter()
        .filter_map(|record| {
            let row: Option<Vec<f64>> = features.iter().map(|f| f.value(record)).collect();
            row.map(|row| {
                let mut cleaned = *record;
                if !keep_trend_20 {
                    cleaned.trend_20 = None;
                }
                if !keep_trend_50 {
                    cleaned.trend_50 = None;
                }
                (cleaned, row)
            })
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OhlcBar;
    use crate::indicators::compute_indicators;
    use chrono::{Duration, NaiveDate};

    fn records_from_closes(closes: &[f64]) -> Vec<IndicatorRecord> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars: Vec<OhlcBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                OhlcBar::new(base + Duration::days(i as i64), c, c * 1.002, c * 0.998, c, 0.0)
            })
            .collect();
        compute_indicators(&bars)
    }

    /// Up leg, choppy middle, down leg, so every regime shows up in the labels.
    fn mixed_closes(n: usize) -> Vec<f64> {
        let third = n / 3;
        (0..n)
            .map(|i| {
                let t = i as f64;
                if i < third {
                    1.10 + t * 0.002
                } else if i < 2 * third {
                    1.10 + third as f64 * 0.002 + (t * 1.3).sin() * 0.01
                } else {
                    1.10 + third as f64 * 0.002 - (i - 2 * third) as f64 * 0.003
                }
            })
            .collect()
    }

    fn fast_ranker() -> ImportanceRanker {
        let config = RankerConfig {
            forest: ForestConfig {
                n_trees: 20,
                ..ForestConfig::default()
            },
            ..RankerConfig::default()
        };
        ImportanceRanker::new(RegimeClassifier::default(), config)
    }

    #[test]
    fn test_ranking_sorted_and_non_negative() {
        let records = records_from_closes(&mixed_closes(240));
        let ranking = fast_ranker().rank(&records);

        assert_eq!(ranking.len(), Feature::DEFAULT_SET.len());
        let weights: Vec<f64> = ranking.iter().map(|e| e.weight).collect();
        assert!(weights.iter().all(|w| *w >= 0.0 && w.is_finite()));
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
        assert!(weights[0] > 0.0);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let records = records_from_closes(&mixed_closes(200));
        let ranker = fast_ranker();
        assert_eq!(ranker.rank(&records), ranker.rank(&records));
    }

    #[test]
    fn test_too_few_complete_rows_is_empty() {
        // SMA_50 is first defined at index 49, so 90 bars leave 41 complete rows
        let records = records_from_closes(&mixed_closes(90));
        let ranker = fast_ranker();

        assert!(ranker.rank(&records).is_empty());
        assert!(matches!(
            ranker.try_rank(&records),
            Err(ExplainError::InsufficientData { required: 50, actual: 41 })
        ));
        assert!(rank_importance(&[]).is_empty());
    }

    #[test]
    fn test_complete_rows_drop_incomplete() {
        let records = records_from_closes(&mixed_closes(80));
        let (rows, matrix) = complete_rows(&records, &Feature::DEFAULT_SET);

        assert_eq!(rows.len(), matrix.len());
        assert!(rows.iter().all(|r| r.sma_50.is_some() && r.volatility.is_some()));
        assert!(matrix.iter().all(|row| row.len() == 9));
        assert_eq!(rows[0].date(), records[49].date());
    }

    #[test]
    fn test_cleaned_rows_drop_unranked_slopes() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 1.10 + 0.04 * (i as f64 / 25.0).sin() + 0.003 * (i as f64 * 1.1).sin())
            .collect();
        let records = records_from_closes(&closes);
        let classifier = RegimeClassifier::default();

        let (rows, _) = complete_rows(&records, &Feature::DEFAULT_SET);
        assert_eq!(rows.len(), 251);
        assert!(rows.iter().all(|r| r.trend_20.is_none() && r.trend_50.is_none()));

        // Same labels as relabelling the rows with the slope removed by hand
        let stripped: Vec<IndicatorRecord> = records[49..]
            .iter()
            .map(|r| IndicatorRecord {
                trend_20: None,
                trend_50: None,
                ..*r
            })
            .collect();
        assert_eq!(
            walk_forward_labels(&rows, &classifier),
            walk_forward_labels(&stripped, &classifier)
        );

        let mut with_trend = Feature::DEFAULT_SET.to_vec();
        with_trend.push(Feature::Trend20);
        let (rows, matrix) = complete_rows(&records, &with_trend);
        assert!(rows.iter().all(|r| r.trend_20.is_some() && r.trend_50.is_none()));
        assert_eq!(matrix[0].len(), 10);
    }

    #[test]
    fn test_single_label_gives_zero_weights() {
        // A steady climb is labelled Uptrend on every complete row, winning
        // any tie with HighVolatility
        let closes: Vec<f64> = (0..150).map(|i| 1.0 + i as f64 * 0.001).collect();
        let records = records_from_closes(&closes);
        let ranking = fast_ranker().rank(&records);

        assert_eq!(ranking.len(), 9);
        assert!(ranking.iter().all(|e| e.weight == 0.0));
    }

    #[test]
    fn test_ranking_helpers() {
        let ranking = ImportanceRanking::new(vec![
            FeatureImportance { feature: Feature::Rsi, weight: 0.2 },
            FeatureImportance { feature: Feature::Volatility, weight: 0.5 },
            FeatureImportance { feature: Feature::Macd, weight: 0.3 },
        ]);

        assert_eq!(ranking.top(2)[0].feature, Feature::Volatility);
        assert_eq!(ranking.top(2)[1].feature, Feature::Macd);
        assert_eq!(ranking.top(10).len(), 3);
        assert_eq!(ranking.get(Feature::Rsi), Some(0.2));
        assert_eq!(ranking.get(Feature::Sma20), None);

        let json = serde_json::to_string(&ranking).unwrap();
        assert!(json.starts_with(r#"[{"feature":"Volatility""#));
    }

    #[test]
    fn test_config_validation() {
        assert!(RankerConfig::default().validate().is_ok());

        let empty = RankerConfig {
            features: vec![],
            ..RankerConfig::default()
        };
        assert!(empty.validate().is_err());

        let duplicate = RankerConfig {
            features: vec![Feature::Rsi, Feature::Rsi],
            ..RankerConfig::default()
        };
        assert!(duplicate.validate().is_err());
    }
}
