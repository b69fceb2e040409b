//! Indicator columns available to the importance model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::IndicatorRecord;

/// An indicator column, named as it appears in reports and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "SMA_20")]
    Sma20,
    #[serde(rename = "SMA_50")]
    Sma50,
    #[serde(rename = "SMA_200")]
    Sma200,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "BB_Width")]
    BbWidth,
    #[serde(rename = "BB_Position")]
    BbPosition,
    #[serde(rename = "Volatility")]
    Volatility,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD_Signal")]
    MacdSignal,
    #[serde(rename = "MACD_Histogram")]
    MacdHistogram,
    #[serde(rename = "Returns")]
    Returns,
    #[serde(rename = "Trend_20")]
    Trend20,
    #[serde(rename = "Trend_50")]
    Trend50,
}

impl Feature {
    /// Columns ranked by default.
    pub const DEFAULT_SET: [Feature; 9] = [
        Feature::Sma20,
        Feature::Sma50,
        Feature::Rsi,
        Feature::BbWidth,
        Feature::BbPosition,
        Feature::Volatility,
        Feature::Macd,
        Feature::MacdHistogram,
        Feature::Returns,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sma20 => "SMA_20",
            Self::Sma50 => "SMA_50",
            Self::Sma200 => "SMA_200",
            Self::Rsi => "RSI",
            Self::BbWidth => "BB_Width",
            Self::BbPosition => "BB_Position",
            Self::Volatility => "Volatility",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_Signal",
            Self::MacdHistogram => "MACD_Histogram",
            Self::Returns => "Returns",
            Self::Trend20 => "Trend_20",
            Self::Trend50 => "Trend_50",
        }
    }

    /// Value of this column in `record`, if defined and finite.
    pub fn value(&self, record: &IndicatorRecord) -> Option<f64> {
        let value = match self {
            Self::Sma20 => record.sma_20,
            Self::Sma50 => record.sma_50,
            Self::Sma200 => record.sma_200,
            Self::Rsi => record.rsi,
            Self::BbWidth => record.bb_width,
            Self::BbPosition => record.bb_position,
            Self::Volatility => record.volatility,
            Self::Macd => Some(record.macd),
            Self::MacdSignal => Some(record.macd_signal),
            Self::MacdHistogram => Some(record.macd_histogram),
            Self::Returns => record.returns,
            Self::Trend20 => record.trend_20,
            Self::Trend50 => record.trend_50,
        };
        value.filter(|v| v.is_finite())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OhlcBar;
    use chrono::NaiveDate;

    #[test]
    fn test_value_lookup() {
        let bar = OhlcBar::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 5.0, 5.1, 4.9, 5.0, 0.0);
        let mut record = IndicatorRecord::from_bar(bar);
        record.rsi = Some(55.0);
        record.macd = 0.02;
        record.bb_position = Some(f64::NAN);

        assert_eq!(Feature::Rsi.value(&record), Some(55.0));
        assert_eq!(Feature::Macd.value(&record), Some(0.02));
        assert_eq!(Feature::Sma20.value(&record), None);
        assert_eq!(Feature::BbPosition.value(&record), None);
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        let json = serde_json::to_string(&Feature::MacdHistogram).unwrap();
        assert_eq!(json, "\"MACD_Histogram\"");

        let parsed: Feature = serde_json::from_str("\"BB_Width\"").unwrap();
        assert_eq!(parsed, Feature::BbWidth);
        assert_eq!(parsed.to_string(), "BB_Width");
    }
}
