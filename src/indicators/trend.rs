//! Trend indicators: SMA, EMA, MACD and moving-average slope.

use super::rolling::{defined, diff, rolling_mean};

/// Simple moving average of the trailing `period` values.
pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&defined(closes), period)
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded from the
/// first observation, no bias adjustment.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut prev = match values.first() {
        Some(first) => *first,
        None => return result,
    };
    result.push(prev);

    for &value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        result.push(prev);
    }

    result
}

/// MACD output series.
#[derive(Debug, Clone)]
pub struct MacdOutput {
    /// Fast EMA - slow EMA
    pub macd_line: Vec<f64>,
    /// EMA of the MACD line
    pub signal_line: Vec<f64>,
    /// MACD line - signal line
    pub histogram: Vec<f64>,
}

/// MACD(fast, slow, signal) on closes.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let macd_line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal);
    let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdOutput {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bar-over-bar change of a moving average; positive when it is rising.
pub fn slope(average: &[Option<f64>]) -> Vec<Option<f64>> {
    diff(average)
}
