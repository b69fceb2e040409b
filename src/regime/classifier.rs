//! Heuristic market regime classifier.
//!
//! Scores the latest indicator record against four mutually exclusive
//! regimes with fixed point rules, then takes the best-scoring regime.
//! Two distributional statistics come from the whole series: the
//! percentile rank of the latest volatility and the upper quartile of
//! Bollinger band width.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::data::IndicatorRecord;
use crate::stats::{percentile_rank, quantile};

/// Market regime classification.
///
/// Declaration order is the tie-break precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegimeCategory {
    /// Price above its averages, RSI in the upper-neutral zone, rising SMA.
    Uptrend,
    /// Price below its averages, RSI in the lower-neutral zone, falling SMA.
    Downtrend,
    /// Volatility high against its own history, wide or stretched bands.
    HighVolatility,
    /// No regime stands out.
    Neutral,
}

impl RegimeCategory {
    /// All categories in precedence order.
    pub const ALL: [RegimeCategory; 4] = [
        RegimeCategory::Uptrend,
        RegimeCategory::Downtrend,
        RegimeCategory::HighVolatility,
        RegimeCategory::Neutral,
    ];

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        match self {
            Self::Uptrend => 0,
            Self::Downtrend => 1,
            Self::HighVolatility => 2,
            Self::Neutral => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uptrend => "Uptrend",
            Self::Downtrend => "Downtrend",
            Self::HighVolatility => "High Volatility",
            Self::Neutral => "Neutral",
        }
    }

    /// Description of the regime.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Uptrend => "Price trending up above its moving averages",
            Self::Downtrend => "Price trending down below its moving averages",
            Self::HighVolatility => "Volatility elevated relative to its history",
            Self::Neutral => "No dominant regime",
        }
    }
}

impl fmt::Display for RegimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short factual statement backing a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum ExplanationFact {
    /// The series was empty.
    InsufficientData,
    /// A required indicator has not warmed up at the latest bar.
    InsufficientIndicators,
    PriceVsAverages {
        close: f64,
        sma_20: f64,
        sma_50: f64,
    },
    RsiLevel {
        rsi: f64,
    },
    VolatilityPercentile {
        percentile: f64,
    },
    BandWidth {
        width: f64,
        upper_quartile: Option<f64>,
    },
    MixedSignals,
}

fn side(value: f64, reference: f64) -> &'static str {
    if value > reference {
        "above"
    } else if value < reference {
        "below"
    } else {
        "at"
    }
}

impl fmt::Display for ExplanationFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "Insufficient data for classification"),
            Self::InsufficientIndicators => {
                write!(f, "Insufficient indicator history for classification")
            }
            Self::PriceVsAverages { close, sma_20, sma_50 } => write!(
                f,
                "Price ({:.4}) {} SMA 20 ({:.4}) and {} SMA 50 ({:.4})",
                close,
                side(*close, *sma_20),
                sma_20,
                side(*close, *sma_50),
                sma_50
            ),
            Self::RsiLevel { rsi } => {
                let zone = if *rsi > 70.0 {
                    "overbought"
                } else if *rsi >= 50.0 {
                    "neutral-high zone"
                } else if *rsi >= 30.0 {
                    "neutral-low zone"
                } else {
                    "oversold"
                };
                write!(f, "RSI at {:.2} ({})", rsi, zone)
            }
            Self::VolatilityPercentile { percentile } => {
                write!(f, "Volatility at the {:.1}% percentile of its history", percentile)
            }
            Self::BandWidth {
                width,
                upper_quartile: Some(q),
            } => {
                let state = if width > q { "expanded" } else { "not expanded" };
                write!(
                    f,
                    "Bollinger Bands {} (width {:.4}, upper quartile {:.4})",
                    state, width, q
                )
            }
            Self::BandWidth {
                width,
                upper_quartile: None,
            } => write!(f, "Bollinger band width {:.4}", width),
            Self::MixedSignals => write!(f, "Mixed indicators, no clear trend"),
        }
    }
}

/// Outcome of a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: RegimeCategory,
    /// In [0, 1].
    pub confidence: f64,
    pub explanation: Vec<ExplanationFact>,
    pub scores: BTreeMap<RegimeCategory, u32>,
}

impl ClassificationResult {
    fn insufficient(fact: ExplanationFact) -> Self {
        Self {
            category: RegimeCategory::Neutral,
            confidence: 0.0,
            explanation: vec![fact],
            scores: zero_scores(),
        }
    }

    /// Points scored by a category.
    pub fn score(&self, category: RegimeCategory) -> u32 {
        self.scores.get(&category).copied().unwrap_or(0)
    }

    /// Explanation joined into one line.
    pub fn explanation_text(&self) -> String {
        self.explanation
            .iter()
            .map(|fact| fact.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn zero_scores() -> BTreeMap<RegimeCategory, u32> {
    RegimeCategory::ALL.iter().map(|c| (*c, 0)).collect()
}

/// Classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inclusive RSI zone scoring for an uptrend.
    pub uptrend_rsi: (f64, f64),
    /// Inclusive RSI zone scoring for a downtrend.
    pub downtrend_rsi: (f64, f64),
    /// Volatility percentile rank above which volatility counts as high.
    pub volatility_percentile: f64,
    /// Quantile of historical band width used as the expansion threshold.
    pub band_width_quantile: f64,
    /// Band position below this is stretched to the lower band.
    pub band_position_low: f64,
    /// Band position above this is stretched to the upper band.
    pub band_position_high: f64,
    /// Points that map to full confidence.
    pub max_score: u32,
    /// Confidence reported when no category scores.
    pub no_signal_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            uptrend_rsi: (50.0, 70.0),
            downtrend_rsi: (30.0, 50.0),
            volatility_percentile: 75.0,
            band_width_quantile: 0.75,
            band_position_low: 0.2,
            band_position_high: 0.8,
            max_score: 4,
            no_signal_confidence: 0.5,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, (lo, hi)) in [("uptrend_rsi", self.uptrend_rsi), ("downtrend_rsi", self.downtrend_rsi)] {
            if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
                return Err(ConfigError::invalid(format!(
                    "classifier.{} must be an ordered range within [0, 100], got ({}, {})",
                    name, lo, hi
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.volatility_percentile) {
            return Err(ConfigError::invalid(format!(
                "classifier.volatility_percentile must be in [0, 100], got {}",
                self.volatility_percentile
            )));
        }
        if !(0.0..=1.0).contains(&self.band_width_quantile) {
            return Err(ConfigError::invalid(format!(
                "classifier.band_width_quantile must be in [0, 1], got {}",
                self.band_width_quantile
            )));
        }
        if self.band_position_low > self.band_position_high {
            return Err(ConfigError::invalid(
                "classifier.band_position_low must not exceed band_position_high",
            ));
        }
        if self.max_score == 0 {
            return Err(ConfigError::invalid("classifier.max_score must be positive"));
        }
        if !(0.0..=1.0).contains(&self.no_signal_confidence) {
            return Err(ConfigError::invalid(format!(
                "classifier.no_signal_confidence must be in [0, 1], got {}",
                self.no_signal_confidence
            )));
        }
        Ok(())
    }
}

/// Rule-based regime classifier. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct RegimeClassifier {
    config: ClassifierConfig,
}

impl RegimeClassifier {
    /// Create a new classifier.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the regime at the last record of `records`.
    pub fn classify(&self, records: &[IndicatorRecord]) -> ClassificationResult {
        let Some(latest) = records.last() else {
            return ClassificationResult::insufficient(ExplanationFact::InsufficientData);
        };

        let (Some(sma_20), Some(sma_50), Some(rsi), Some(bb_width), Some(volatility)) = (
            latest.sma_20,
            latest.sma_50,
            latest.rsi,
            latest.bb_width,
            latest.volatility,
        ) else {
            return ClassificationResult::insufficient(ExplanationFact::InsufficientIndicators);
        };

        let close = latest.close();
        let cfg = &self.config;

        let vol_history: Vec<f64> = records.iter().filter_map(|r| r.volatility).collect();
        let vol_percentile = percentile_rank(&vol_history, volatility).unwrap_or(0.0);

        let width_history: Vec<f64> = records.iter().filter_map(|r| r.bb_width).collect();
        let width_threshold = quantile(&width_history, cfg.band_width_quantile);

        let trend = latest.trend_20.unwrap_or(0.0);
        let in_zone = |(lo, hi): (f64, f64)| rsi >= lo && rsi <= hi;

        let mut scores = zero_scores();

        let uptrend = u32::from(close > sma_20)
            + u32::from(close > sma_50)
            + u32::from(in_zone(cfg.uptrend_rsi))
            + u32::from(trend > 0.0);

        let downtrend = u32::from(close < sma_20)
            + u32::from(close < sma_50)
            + u32::from(in_zone(cfg.downtrend_rsi))
            + u32::from(trend < 0.0);

        let mut high_volatility = 0;
        if vol_percentile > cfg.volatility_percentile {
            high_volatility += 2;
        }
        if width_threshold.is_some_and(|t| bb_width > t) {
            high_volatility += 1;
        }
        if latest
            .bb_position
            .is_some_and(|p| p < cfg.band_position_low || p > cfg.band_position_high)
        {
            high_volatility += 1;
        }

        scores.insert(RegimeCategory::Uptrend, uptrend);
        scores.insert(RegimeCategory::Downtrend, downtrend);
        scores.insert(RegimeCategory::HighVolatility, high_volatility);

        let max_score = scores.values().copied().max().unwrap_or(0);

        let (category, confidence) = if max_score == 0 {
            scores.insert(RegimeCategory::Neutral, 1);
            (RegimeCategory::Neutral, cfg.no_signal_confidence)
        } else {
            let category = RegimeCategory::ALL
                .iter()
                .copied()
                .find(|c| scores[c] == max_score)
                .unwrap_or(RegimeCategory::Neutral);
            let confidence = (max_score as f64 / cfg.max_score as f64).min(1.0);
            (category, confidence)
        };

        let explanation = match category {
            RegimeCategory::Uptrend | RegimeCategory::Downtrend => vec![
                ExplanationFact::PriceVsAverages { close, sma_20, sma_50 },
                ExplanationFact::RsiLevel { rsi },
            ],
            RegimeCategory::HighVolatility => vec![
                ExplanationFact::VolatilityPercentile {
                    percentile: vol_percentile,
                },
                ExplanationFact::BandWidth {
                    width: bb_width,
                    upper_quartile: width_threshold,
                },
            ],
            RegimeCategory::Neutral => vec![ExplanationFact::MixedSignals],
        };

        debug!(
            %category,
            confidence,
            uptrend,
            downtrend,
            high_volatility,
            "Classified latest bar"
        );

        ClassificationResult {
            category,
            confidence,
            explanation,
            scores,
        }
    }
}

/// Classify with the default configuration.
pub fn classify(records: &[IndicatorRecord]) -> ClassificationResult {
    RegimeClassifier::default().classify(records)
}
