//! Rolling-window primitives shared by the indicators.
//!
//! A window produces a value only when every observation in it is defined,
//! so warm-up positions come out as `None`.

use statrs::statistics::Statistics;

/// Apply `f` to every trailing window of `window` fully-defined values.
pub fn rolling_apply<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let len = values.len();
    let mut result = vec![None; len];

    if window == 0 || len < window {
        return result;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..len {
        buf.clear();
        buf.extend(values[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            let value = f(&buf);
            result[i] = value.is_finite().then_some(value);
        }
    }

    result
}

/// Trailing arithmetic mean.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling_apply(values, window, |w| w.iter().std_dev())
}

/// Centered rolling extreme over `[i - window/2, i - window/2 + window - 1]`.
fn centered_extreme<F>(values: &[f64], window: usize, pick: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let len = values.len();
    let mut result = vec![None; len];

    if window == 0 || len < window {
        return result;
    }

    let before = window / 2;
    for (i, slot) in result.iter_mut().enumerate() {
        if i < before {
            continue;
        }
        let start = i - before;
        let end = start + window;
        if end > len {
            break;
        }
        *slot = values[start..end].iter().copied().reduce(&pick);
    }

    result
}

/// Centered rolling minimum.
pub fn centered_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    centered_extreme(values, window, f64::min)
}

/// Centered rolling maximum.
pub fn centered_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    centered_extreme(values, window, f64::max)
}

/// Simple bar-over-bar percentage change. Undefined after a zero value.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev != 0.0 {
            result[i] = Some((values[i] - prev) / prev);
        }
    }
    result
}

/// First difference of a possibly-undefined series.
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    for i in 1..values.len() {
        if let (Some(prev), Some(curr)) = (values[i - 1], values[i]) {
            result[i] = Some(curr - prev);
        }
    }
    result
}

/// Wrap a fully-defined series.
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| Some(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_basic() {
        let values = defined(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = rolling_mean(&values, 3);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((result[3].unwrap() - 3.0).abs() < 1e-10);
        assert!((result[4].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_mean_insufficient_data() {
        let values = defined(&[1.0, 2.0]);
        assert!(rolling_mean(&values, 5).iter().all(|v| v.is_none()));
        assert!(rolling_mean(&values, 0).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rolling_skips_undefined_windows() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let result = rolling_mean(&values, 2);

        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 1.5).abs() < 1e-10);
        assert!((result[3].unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_std_sample() {
        let values = defined(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let result = rolling_std(&values, 8);
        // Sample variance = 32 / 7
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((result[7].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        let values = defined(&[5.0; 10]);
        let result = rolling_std(&values, 4);
        assert_eq!(result[9], Some(0.0));
    }

    #[test]
    fn test_centered_window_bounds() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let lows = centered_min(&values, 4);
        let highs = centered_max(&values, 4);

        // Window at i covers [i - 2, i + 1]
        assert!(lows[0].is_none());
        assert!(lows[1].is_none());
        assert_eq!(lows[2], Some(0.0));
        assert_eq!(highs[2], Some(3.0));
        assert_eq!(lows[8], Some(6.0));
        assert_eq!(highs[8], Some(9.0));
        assert!(lows[9].is_none());
    }

    #[test]
    fn test_pct_change() {
        let result = pct_change(&[100.0, 110.0, 99.0, 0.0, 5.0]);
        assert!(result[0].is_none());
        assert!((result[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((result[2].unwrap() - -0.1).abs() < 1e-12);
        assert!((result[3].unwrap() - -1.0).abs() < 1e-12);
        // Previous close of zero
        assert!(result[4].is_none());
    }

    #[test]
    fn test_diff() {
        let result = diff(&[None, Some(1.0), Some(3.0), None, Some(2.0)]);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_eq!(result[2], Some(2.0));
        assert!(result[3].is_none());
        assert!(result[4].is_none());
    }
}
