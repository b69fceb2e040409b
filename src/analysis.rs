//! End-to-end market analysis.
//!
//! Computes the indicator series once and hands it to both consumers: the
//! regime classifier (label, confidence, explanation) and the importance
//! ranker (which indicators drove past labels). A failed ranking leaves the
//! classification untouched.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::data::{IndicatorRecord, OhlcBar};
use crate::explain::{ImportanceRanker, ImportanceRanking};
use crate::indicators::compute_indicators;
use crate::regime::{ClassificationResult, RegimeClassifier};

/// Features shown by [`MarketAnalysis::summary`].
pub const SUMMARY_TOP_FEATURES: usize = 5;

/// Headline indicator values of the latest bar. Undefined values stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub price: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi: Option<f64>,
    pub volatility: Option<f64>,
    pub bb_width: Option<f64>,
    pub bb_position: Option<f64>,
}

impl IndicatorSummary {
    pub fn from_record(record: &IndicatorRecord) -> Self {
        Self {
            price: record.close(),
            sma_20: record.sma_20,
            sma_50: record.sma_50,
            rsi: record.rsi,
            volatility: record.volatility,
            bb_width: record.bb_width,
            bb_position: record.bb_position,
        }
    }
}

/// Result of [`analyze_market`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub classification: ClassificationResult,
    pub feature_importance: ImportanceRanking,
    /// `None` for an empty bar series.
    pub indicators: Option<IndicatorSummary>,
    pub latest: Option<IndicatorRecord>,
}

impl MarketAnalysis {
    pub fn summary(&self) -> String {
        self.summary_with_top(SUMMARY_TOP_FEATURES)
    }

    /// Plain-text report listing the `top` heaviest features.
    pub fn summary_with_top(&self, top: usize) -> String {
        let c = &self.classification;
        let mut out = String::new();

        out.push_str("Market Regime Analysis\n");
        out.push_str("======================\n");
        if let Some(latest) = &self.latest {
            out.push_str(&format!("Date: {}\n", latest.date()));
        }
        out.push_str(&format!(
            "\nRegime: {} ({})\n\
             Confidence: {:.0}%\n\
             Explanation: {}\n",
            c.category,
            c.category.description(),
            c.confidence * 100.0,
            c.explanation_text()
        ));

        if let Some(ind) = &self.indicators {
            out.push_str(&format!(
                "\nPrice: {:.5}\n\
                 SMA 20: {}\n\
                 SMA 50: {}\n\
                 RSI: {}\n\
                 Volatility: {}%\n\
                 BB Width: {}\n\
                 BB Position: {}\n",
                ind.price,
                fmt_opt(ind.sma_20, 5),
                fmt_opt(ind.sma_50, 5),
                fmt_opt(ind.rsi, 1),
                fmt_opt(ind.volatility, 2),
                fmt_opt(ind.bb_width, 5),
                fmt_opt(ind.bb_position, 2)
            ));
        }

        out.push('\n');
        if self.feature_importance.is_empty() {
            out.push_str("Feature importance: not available");
        } else {
            out.push_str("Top features:");
            for (rank, entry) in self.feature_importance.top(top).iter().enumerate() {
                out.push_str(&format!(
                    "\n  {}. {:<15} {:.3}",
                    rank + 1,
                    entry.feature.name(),
                    entry.weight
                ));
            }
        }

        out
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

/// Run the full analysis on an ordered bar series.
pub fn analyze_market(bars: &[OhlcBar], config: &AnalysisConfig) -> MarketAnalysis {
    let records = compute_indicators(bars);

    let classifier = RegimeClassifier::new(config.classifier.clone());
    let classification = classifier.classify(&records);

    let ranker = ImportanceRanker::new(classifier, config.ranker.clone());
    let feature_importance = ranker.rank(&records);

    let latest = records.last().copied();

    info!(
        bars = bars.len(),
        regime = %classification.category,
        confidence = classification.confidence,
        ranked_features = feature_importance.len(),
        "Market analysis complete"
    );

    MarketAnalysis {
        classification,
        feature_importance,
        indicators: latest.as_ref().map(IndicatorSummary::from_record),
        latest,
    }
}
