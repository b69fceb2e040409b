//! Indicator engine.
//!
//! Turns an ordered OHLC series into a parallel series of `IndicatorRecord`s,
//! one per bar, same order. Pure and deterministic; the whole series is
//! recomputed on every call.

use tracing::debug;

use crate::data::{IndicatorRecord, OhlcBar};

use super::oscillator::rsi;
use super::rolling::{centered_max, centered_min, pct_change};
use super::trend::{macd, slope, sma};
use super::volatility::{bollinger, historical_volatility};

pub const SMA_FAST_PERIOD: usize = 20;
pub const SMA_SLOW_PERIOD: usize = 50;
pub const SMA_LONG_PERIOD: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_FACTOR: f64 = 2.0;
pub const VOLATILITY_PERIOD: usize = 20;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const LEVELS_WINDOW: usize = 20;

/// Compute every indicator for every bar.
pub fn compute_indicators(bars: &[OhlcBar]) -> Vec<IndicatorRecord> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();

    let sma_20 = sma(&closes, SMA_FAST_PERIOD);
    let sma_50 = sma(&closes, SMA_SLOW_PERIOD);
    let sma_200 = sma(&closes, SMA_LONG_PERIOD);
    let trend_20 = slope(&sma_20);
    let trend_50 = slope(&sma_50);

    let rsi_values = rsi(&closes, RSI_PERIOD);
    let bb = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_FACTOR);
    let volatility = historical_volatility(&closes, VOLATILITY_PERIOD);
    let macd_out = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let support = centered_min(&lows, LEVELS_WINDOW);
    let resistance = centered_max(&highs, LEVELS_WINDOW);
    let returns = pct_change(&closes);

    let records: Vec<IndicatorRecord> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRecord {
            bar: *bar,
            sma_20: sma_20[i],
            sma_50: sma_50[i],
            sma_200: sma_200[i],
            rsi: rsi_values[i],
            bb_upper: bb.upper[i],
            bb_middle: bb.middle[i],
            bb_lower: bb.lower[i],
            bb_width: bb.width[i],
            bb_position: bb.position[i],
            volatility: volatility[i],
            macd: macd_out.macd_line[i],
            macd_signal: macd_out.signal_line[i],
            macd_histogram: macd_out.histogram[i],
            support: support[i],
            resistance: resistance[i],
            returns: returns[i],
            trend_20: trend_20[i],
            trend_50: trend_50[i],
        })
        .collect();

    debug!(bars = bars.len(), "Computed indicator series");

    records
}
