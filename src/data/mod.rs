pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{dataframe_to_bars, load_ohlc_csv, LoaderError, REQUIRED_COLUMNS};
pub use types::{IndicatorRecord, OhlcBar};
pub use validation::{validate_bars, BarValidationReport, CheckResult};
