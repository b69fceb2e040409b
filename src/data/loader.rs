//! OHLC CSV loader.
//!
//! Reads daily bars from a CSV file with a header row. Column names are
//! matched case-insensitively:
//! - date: `YYYY-MM-DD`, optionally followed by a time part
//! - open, high, low, close
//! - volume (optional, 0 when absent)
//!
//! Rows come back in file order. Ordering, deduplication and sanity checks
//! are left to [`super::validate_bars`].

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use super::types::OhlcBar;

/// Price columns every file must have.
pub const REQUIRED_COLUMNS: &[&str] = &["date", "open", "high", "low", "close"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load OHLC bars from a CSV file.
pub fn load_ohlc_csv(path: impl AsRef<Path>) -> Result<Vec<OhlcBar>, LoaderError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?;

    let bars = dataframe_to_bars(&df)?;
    info!(path = %path.display(), bars = bars.len(), "Loaded OHLC data");
    Ok(bars)
}

/// Convert a frame with OHLC columns into bars.
pub fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<OhlcBar>, LoaderError> {
    let dates = df.column(&find_column(df, "date")?)?.str()?.clone();
    let opens = price_column(df, "open")?;
    let highs = price_column(df, "high")?;
    let lows = price_column(df, "low")?;
    let closes = price_column(df, "close")?;
    let volumes = match find_column(df, "volume") {
        Ok(name) => Some(float_column(df, &name)?),
        Err(_) => None,
    };

    let mut bars = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let raw_date = dates
            .get(idx)
            .ok_or_else(|| LoaderError::InvalidData(format!("Missing date in row {}", idx + 1)))?;
        let date = parse_date(raw_date)?;

        // Nulls become NaN so validation drops the bar
        let value = |col: &Float64Chunked| col.get(idx).unwrap_or(f64::NAN);

        bars.push(OhlcBar::new(
            date,
            value(&opens),
            value(&highs),
            value(&lows),
            value(&closes),
            volumes
                .as_ref()
                .and_then(|col| col.get(idx))
                .unwrap_or(0.0),
        ));
    }

    Ok(bars)
}

/// Actual name of a column, matched case-insensitively.
fn find_column(df: &DataFrame, wanted: &str) -> Result<String, LoaderError> {
    df.get_column_names()
        .into_iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .map(|name| name.to_string())
        .ok_or_else(|| LoaderError::InvalidData(format!("Missing column: {}", wanted)))
}

fn price_column(df: &DataFrame, wanted: &str) -> Result<Float64Chunked, LoaderError> {
    let name = find_column(df, wanted)?;
    float_column(df, &name)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked, LoaderError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.clone())
}

/// Parse `YYYY-MM-DD`, ignoring anything after the date.
fn parse_date(raw: &str) -> Result<NaiveDate, LoaderError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| LoaderError::InvalidData(format!("Invalid date {:?}: {}", raw, e)))
}
