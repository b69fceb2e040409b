//! Core data types for regime analysis.
//!
//! `OhlcBar` is the raw daily quote as delivered by the data collaborator.
//! `IndicatorRecord` pairs a bar with every derived indicator value; values
//! that need more history than is available are `None` rather than a
//! sentinel float.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLC bar for a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// All four prices are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// `low <= min(open, close) <= max(open, close) <= high`.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// One bar plus all indicator values derived up to (and, for the centered
/// support/resistance window, around) it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub bar: OhlcBar,

    /// Moving averages of close
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,

    /// RSI(14), in [0, 100]
    pub rsi: Option<f64>,

    /// Bollinger Bands(20, 2)
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub bb_position: Option<f64>,

    /// Annualized volatility of daily returns, in percent
    pub volatility: Option<f64>,

    /// MACD(12, 26, 9); EMAs are seeded from the first close so these are
    /// always defined.
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,

    /// Centered rolling min of low / max of high
    pub support: Option<f64>,
    pub resistance: Option<f64>,

    /// Simple close-to-close return
    pub returns: Option<f64>,

    /// First difference of SMA(20) / SMA(50)
    pub trend_20: Option<f64>,
    pub trend_50: Option<f64>,
}

impl IndicatorRecord {
    /// Record with no derived values, MACD at zero.
    pub fn from_bar(bar: OhlcBar) -> Self {
        Self {
            bar,
            sma_20: None,
            sma_50: None,
            sma_200: None,
            rsi: None,
            bb_upper: None,
            bb_middle: None,
            bb_lower: None,
            bb_width: None,
            bb_position: None,
            volatility: None,
            macd: 0.0,
            macd_signal: 0.0,
            macd_histogram: 0.0,
            support: None,
            resistance: None,
            returns: None,
            trend_20: None,
            trend_50: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}
