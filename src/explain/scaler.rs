//! Column standardization to zero mean and unit variance.

use statrs::statistics::Statistics;

use super::error::ExplainError;

/// Per-column mean and scale fitted on a row-major sample.
///
/// Uses the population standard deviation. A column with zero (or
/// non-finite) spread keeps a scale of 1, so it standardizes to zeros
/// instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and scales on `rows`.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ExplainError> {
        let width = check_matrix(rows)?;

        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);

        for col in 0..width {
            let column = rows.iter().map(|row| row[col]);
            let mean = column.clone().mean();
            let std = column.population_std_dev();

            means.push(mean);
            scales.push(if std.is_finite() && std > 0.0 { std } else { 1.0 });
        }

        Ok(Self { means, scales })
    }

    /// Standardize `rows` with the fitted parameters.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ExplainError> {
        let width = check_matrix(rows)?;
        if width != self.means.len() {
            return Err(ExplainError::degenerate(format!(
                "expected {} columns, got {}",
                self.means.len(),
                width
            )));
        }

        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(x, (mean, scale))| (x - mean) / scale)
                    .collect()
            })
            .collect())
    }

    pub fn fit_transform(rows: &[Vec<f64>]) -> Result<(Self, Vec<Vec<f64>>), ExplainError> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Non-empty, rectangular, finite. Returns the row width.
fn check_matrix(rows: &[Vec<f64>]) -> Result<usize, ExplainError> {
    let first = rows
        .first()
        .ok_or_else(|| ExplainError::degenerate("no rows to standardize"))?;
    let width = first.len();
    if width == 0 {
        return Err(ExplainError::degenerate("rows have no columns"));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(ExplainError::degenerate("rows have different lengths"));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ExplainError::degenerate("non-finite value in feature matrix"));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_columns() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0], vec![4.0, 40.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&rows).unwrap();

        assert!((scaler.means()[0] - 2.5).abs() < 1e-12);
        assert!((scaler.means()[1] - 25.0).abs() < 1e-12);

        for col in 0..2 {
            let values: Vec<f64> = scaled.iter().map(|r| r[col]).collect();
            let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
            let var: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_variance_column_becomes_zero() {
        let rows = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&rows).unwrap();

        assert_eq!(scaler.scales()[1], 1.0);
        assert!(scaled.iter().all(|r| r[1] == 0.0));
        assert!(scaled.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(StandardScaler::fit(&[]).is_err());
        assert!(StandardScaler::fit(&[vec![]]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0, f64::NAN]]).is_err());
    }

    #[test]
    fn test_transform_width_mismatch() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(scaler.transform(&[vec![1.0]]).is_err());
    }
}
