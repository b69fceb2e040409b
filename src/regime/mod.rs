//! Market regime classification module.
//!
//! Scores the latest bar into one of four regimes:
//! - Uptrend: close above SMA 20/50, RSI 50-70, SMA 20 rising
//! - Downtrend: close below SMA 20/50, RSI 30-50, SMA 20 falling
//! - High Volatility: volatility above its 75th percentile, wide or stretched bands
//! - Neutral: nothing scores

pub mod classifier;

pub use classifier::{
    classify, ClassificationResult, ClassifierConfig, ExplanationFact, RegimeCategory,
    RegimeClassifier,
};
