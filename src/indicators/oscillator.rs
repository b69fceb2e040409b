//! Momentum oscillators.

use super::rolling::rolling_mean;

/// Relative Strength Index over simple trailing averages of gains and losses.
///
/// The first bar has no previous close and counts as a zero move, so the
/// first value appears at index `period - 1`. A window with no losses
/// saturates at 100; a window with neither gains nor losses is undefined.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let delta = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain?, loss?) {
            (g, l) if l == 0.0 && g == 0.0 => None,
            (_, l) if l == 0.0 => Some(100.0),
            (g, l) => Some(100.0 - 100.0 / (1.0 + g / l)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_warmup_and_range() {
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let values = rsi(&prices, 14);

        assert_eq!(values.len(), prices.len());
        assert!(values[..13].iter().all(|v| v.is_none()));
        for v in values[13..].iter() {
            let v = v.unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_rsi_known_value() {
        // Window at index 3: deltas [0, +1, -1, +2], avg gain 0.75, avg loss 0.25
        let values = rsi(&[10.0, 11.0, 10.0, 12.0], 4);
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((values[3].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_saturates_without_losses() {
        let increasing: Vec<f64> = (0..20).map(|x| x as f64).collect();
        let values = rsi(&increasing, 14);
        assert_eq!(values[13], Some(100.0));
        assert_eq!(values[19], Some(100.0));
    }

    #[test]
    fn test_rsi_zero_without_gains() {
        let decreasing: Vec<f64> = (0..20).map(|x| (20 - x) as f64).collect();
        let values = rsi(&decreasing, 14);
        assert_eq!(values[19], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_undefined() {
        let values = rsi(&[5.0; 30], 14);
        assert!(values.iter().all(|v| v.is_none()));
    }
}
