//! Bar hygiene before indicator computation.
//!
//! Checks:
//! - Finite prices (bars with NaN or infinite OHLC are dropped)
//! - Consistent ranges (low <= open/close <= high, otherwise dropped)
//! - Price outliers outside Q1 - 3*IQR .. Q3 + 3*IQR (logged, kept)
//! - Chronological order (sorted ascending, duplicate dates dropped)

use tracing::{info, warn};

use crate::stats::iqr_bounds;

use super::types::OhlcBar;

/// IQR multiplier for the outlier check.
pub const OUTLIER_IQR_FACTOR: f64 = 3.0;

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// What `validate_bars` found and removed.
#[derive(Debug, Clone)]
pub struct BarValidationReport {
    pub input_bars: usize,
    pub output_bars: usize,
    pub non_finite: usize,
    pub inconsistent: usize,
    pub duplicate_dates: usize,
    /// Outlier count per price column (not removed).
    pub outliers: Vec<(&'static str, usize)>,
    pub checks: Vec<CheckResult>,
}

impl BarValidationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn dropped(&self) -> usize {
        self.input_bars - self.output_bars
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "{} bars in, {} out ({} dropped): {}/{} checks passed",
            self.input_bars,
            self.output_bars,
            self.dropped(),
            passed,
            self.checks.len()
        )
    }
}

/// Clean a bar series for indicator computation.
pub fn validate_bars(bars: Vec<OhlcBar>) -> (Vec<OhlcBar>, BarValidationReport) {
    let input_bars = bars.len();
    let mut checks = Vec::new();

    let (mut kept, non_finite_bars): (Vec<OhlcBar>, Vec<OhlcBar>) =
        bars.into_iter().partition(OhlcBar::is_finite);
    let non_finite = non_finite_bars.len();
    if non_finite == 0 {
        checks.push(CheckResult::pass("finite_prices", "All prices finite"));
    } else {
        warn!(count = non_finite, "Dropping bars with non-finite prices");
        checks.push(CheckResult::fail(
            "finite_prices",
            &format!("{} bars with non-finite prices dropped", non_finite),
            Some(dates_of(&non_finite_bars)),
        ));
    }

    let inconsistent_bars: Vec<OhlcBar> = kept.iter().filter(|b| !b.is_consistent()).copied().collect();
    kept.retain(OhlcBar::is_consistent);
    let inconsistent = inconsistent_bars.len();
    if inconsistent == 0 {
        checks.push(CheckResult::pass("price_ranges", "All bars have low <= open/close <= high"));
    } else {
        warn!(count = inconsistent, "Dropping bars with inconsistent OHLC ranges");
        checks.push(CheckResult::fail(
            "price_ranges",
            &format!("{} bars with inconsistent ranges dropped", inconsistent),
            Some(dates_of(&inconsistent_bars)),
        ));
    }

    let outliers = count_outliers(&kept);
    let total_outliers: usize = outliers.iter().map(|(_, n)| n).sum();
    if total_outliers == 0 {
        checks.push(CheckResult::pass("outliers", "No price outliers"));
    } else {
        checks.push(CheckResult::fail(
            "outliers",
            &format!("{} price outliers (kept)", total_outliers),
            Some(
                outliers
                    .iter()
                    .filter(|(_, n)| *n > 0)
                    .map(|(col, n)| format!("{}: {}", col, n))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ));
    }

    // Stable sort keeps the first occurrence of a duplicated date first
    kept.sort_by_key(|b| b.date);
    let before_dedup = kept.len();
    kept.dedup_by_key(|b| b.date);
    let duplicate_dates = before_dedup - kept.len();
    if duplicate_dates == 0 {
        checks.push(CheckResult::pass("unique_dates", "Dates unique"));
    } else {
        warn!(count = duplicate_dates, "Dropping bars with duplicate dates");
        checks.push(CheckResult::fail(
            "unique_dates",
            &format!("{} duplicate dates dropped", duplicate_dates),
            None,
        ));
    }

    let report = BarValidationReport {
        input_bars,
        output_bars: kept.len(),
        non_finite,
        inconsistent,
        duplicate_dates,
        outliers,
        checks,
    };
    info!("{}", report.summary());

    (kept, report)
}

fn count_outliers(bars: &[OhlcBar]) -> Vec<(&'static str, usize)> {
    let columns: [(&'static str, fn(&OhlcBar) -> f64); 4] = [
        ("open", |b| b.open),
        ("high", |b| b.high),
        ("low", |b| b.low),
        ("close", |b| b.close),
    ];

    columns
        .iter()
        .map(|(name, get)| {
            let values: Vec<f64> = bars.iter().map(get).collect();
            let count = match iqr_bounds(&values, OUTLIER_IQR_FACTOR) {
                Some((lo, hi)) => values.iter().filter(|v| **v < lo || **v > hi).count(),
                None => 0,
            };
            if count > 0 {
                warn!(column = *name, count, "Price outliers detected");
            }
            (*name, count)
        })
        .collect()
}

fn dates_of(bars: &[OhlcBar]) -> String {
    let dates: Vec<String> = bars.iter().take(10).map(|b| b.date.to_string()).collect();
    if bars.len() > dates.len() {
        format!("{}, ...", dates.join(", "))
    } else {
        dates.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar(day: i64, close: f64) -> OhlcBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day);
        OhlcBar::new(date, close, close + 0.01, close - 0.01, close, 100.0)
    }

    #[test]
    fn test_clean_input_passes() {
        let bars: Vec<OhlcBar> = (0..30).map(|i| bar(i, 1.1 + i as f64 * 0.001)).collect();
        let (out, report) = validate_bars(bars.clone());

        assert_eq!(out, bars);
        assert!(report.all_passed());
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_drops_non_finite_and_inconsistent() {
        let mut bars: Vec<OhlcBar> = (0..10).map(|i| bar(i, 1.1)).collect();
        bars[3].close = f64::NAN;
        bars[5].high = 1.0; // below low

        let (out, report) = validate_bars(bars);

        assert_eq!(out.len(), 8);
        assert_eq!(report.non_finite, 1);
        assert_eq!(report.inconsistent, 1);
        assert_eq!(report.failed_checks().len(), 2);
        assert!(out.iter().all(|b| b.is_finite() && b.is_consistent()));
    }

    #[test]
    fn test_sorts_and_dedups_dates() {
        let first = bar(2, 1.10);
        let mut duplicate = bar(2, 1.20);
        duplicate.volume = 5.0;
        let bars = vec![bar(3, 1.1), first, bar(0, 1.1), duplicate, bar(1, 1.1)];

        let (out, report) = validate_bars(bars);

        assert_eq!(out.len(), 4);
        assert!(out.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(out[2], first);
        assert_eq!(report.duplicate_dates, 1);
    }

    #[test]
    fn test_outliers_are_logged_not_removed() {
        let mut bars: Vec<OhlcBar> = (0..40).map(|i| bar(i, 1.1 + (i % 5) as f64 * 0.001)).collect();
        bars[20] = bar(20, 5.0);

        let (out, report) = validate_bars(bars);

        assert_eq!(out.len(), 40);
        assert!(report.outliers.iter().any(|(col, n)| *col == "close" && *n == 1));
        assert!(!report.all_passed());
    }

    #[test]
    fn test_empty_input() {
        let (out, report) = validate_bars(Vec::new());
        assert!(out.is_empty());
        assert!(report.all_passed());
        assert_eq!(report.summary(), "0 bars in, 0 out (0 dropped): 4/4 checks passed");
    }
}
