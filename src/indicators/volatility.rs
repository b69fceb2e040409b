//! Band and dispersion indicators.

use super::rolling::{defined, pct_change, rolling_mean, rolling_std};

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Bollinger Bands output series.
#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    /// upper - lower
    pub width: Vec<Option<f64>>,
    /// (close - lower) / (upper - lower); `None` for zero-width bands
    pub position: Vec<Option<f64>>,
}

/// Bollinger Bands around an SMA, sized by the trailing sample standard
/// deviation of close.
pub fn bollinger(closes: &[f64], period: usize, std_factor: f64) -> BollingerOutput {
    let series = defined(closes);
    let middle = rolling_mean(&series, period);
    let std = rolling_std(&series, period);

    let len = closes.len();
    let mut upper = vec![None; len];
    let mut lower = vec![None; len];
    let mut width = vec![None; len];
    let mut position = vec![None; len];

    for i in 0..len {
        let (Some(mid), Some(sd)) = (middle[i], std[i]) else {
            continue;
        };
        let half_width = std_factor * sd;
        let up = mid + half_width;
        let lo = mid - half_width;

        upper[i] = Some(up);
        lower[i] = Some(lo);
        width[i] = Some(up - lo);
        if up > lo {
            position[i] = Some((closes[i] - lo) / (up - lo));
        }
    }

    BollingerOutput {
        upper,
        middle,
        lower,
        width,
        position,
    }
}

/// Annualized rolling volatility of simple daily returns, in percent.
pub fn historical_volatility(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_std(&pct_change(closes), period)
        .into_iter()
        .map(|sd| sd.map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt() * 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_basic() {
        let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let bb = bollinger(&closes, 3, 2.0);

        assert!(bb.middle[1].is_none());
        assert!(bb.width[1].is_none());

        // Window [1, 2, 3]: mean 2, sample std 1
        assert!((bb.middle[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((bb.upper[2].unwrap() - 4.0).abs() < 1e-10);
        assert!((bb.lower[2].unwrap() - 0.0).abs() < 1e-10);
        assert!((bb.width[2].unwrap() - 4.0).abs() < 1e-10);
        // Close 3 in band [0, 4]
        assert!((bb.position[2].unwrap() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_bollinger_width_is_twice_k_std() {
        let closes: Vec<f64> = (0..40).map(|i| 5.0 + (i as f64 * 0.7).sin()).collect();
        let bb = bollinger(&closes, 20, 2.0);
        let std = rolling_std(&defined(&closes), 20);

        for i in 19..40 {
            let expected = 2.0 * 2.0 * std[i].unwrap();
            assert!((bb.width[i].unwrap() - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_bollinger_zero_width_has_no_position() {
        let bb = bollinger(&[5.0; 25], 20, 2.0);

        assert_eq!(bb.width[24], Some(0.0));
        assert_eq!(bb.upper[24], bb.lower[24]);
        assert!(bb.position[24].is_none());
    }

    #[test]
    fn test_volatility_warmup() {
        let closes: Vec<f64> = (0..30).map(|i| 5.0 + (i % 3) as f64 * 0.01).collect();
        let vol = historical_volatility(&closes, 20);

        // First return at index 1, so the first full window ends at index 20
        assert!(vol[19].is_none());
        assert!(vol[20].unwrap() > 0.0);
    }

    #[test]
    fn test_volatility_constant_is_zero() {
        let vol = historical_volatility(&[5.0; 30], 20);
        assert_eq!(vol[29], Some(0.0));
    }

    #[test]
    fn test_volatility_annualization() {
        // Alternating returns of +1% / -1% (approximately)
        let mut closes = vec![100.0];
        for i in 1..22 {
            let prev = closes[i - 1];
            closes.push(if i % 2 == 0 { prev * 1.01 } else { prev * 0.99 });
        }
        let returns = pct_change(&closes);
        let daily_sd = rolling_std(&returns, 20)[21].unwrap();
        let vol = historical_volatility(&closes, 20)[21].unwrap();

        assert!((vol - daily_sd * 252.0_f64.sqrt() * 100.0).abs() < 1e-10);
    }
}
