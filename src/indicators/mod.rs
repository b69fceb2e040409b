//! Technical indicator engine.
//!
//! Rolling statistics over daily closes:
//! - Trend: SMA(20/50/200), MACD(12, 26, 9), SMA slope
//! - Oscillator: RSI(14)
//! - Bands: Bollinger(20, 2), annualized volatility(20)
//! - Levels: centered 20-bar support/resistance

pub mod engine;
pub mod oscillator;
pub mod rolling;
pub mod trend;
pub mod volatility;

pub use engine::compute_indicators;
pub use oscillator::rsi;
pub use trend::{ema, macd, sma, MacdOutput};
pub use volatility::{bollinger, historical_volatility, BollingerOutput};
