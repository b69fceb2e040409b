//! forex-advisor CLI
//!
//! # Classify the current regime of a daily OHLC file
//! forex-advisor analyze --data data/eurusd.csv
//!
//! # Same, with custom thresholds and JSON output
//! forex-advisor analyze --data data/eurusd.csv --config config/analysis.toml --json
//!
//! # Print the last indicator rows
//! forex-advisor indicators --data data/eurusd.csv --tail 20

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use forex_advisor::{
    analyze_market, compute_indicators, load_ohlc_csv, validate_bars, AnalysisConfig,
    IndicatorRecord, OhlcBar,
};

#[derive(Parser)]
#[command(name = "forex-advisor")]
#[command(about = "Currency-pair regime classification and indicator importance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the latest bar and rank indicator importance
    Analyze {
        /// Path to OHLC CSV file
        #[arg(short, long)]
        data: String,

        /// Path to TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Number of features to list in the text report
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Print computed indicators for the most recent bars
    Indicators {
        /// Path to OHLC CSV file
        #[arg(short, long)]
        data: String,

        /// Number of trailing rows to print
        #[arg(short, long, default_value_t = 10)]
        tail: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("forex_advisor=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            data,
            config,
            json,
            top,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path))?,
                None => AnalysisConfig::default(),
            };
            let bars = load_bars(&data)?;
            let analysis = analyze_market(&bars, &config);

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("{}", analysis.summary_with_top(top));
            }
        }
        Commands::Indicators { data, tail } => {
            let bars = load_bars(&data)?;
            let records = compute_indicators(&bars);
            let start = records.len().saturating_sub(tail);
            print_indicator_table(&records[start..]);
        }
    }

    Ok(())
}

fn load_bars(path: &str) -> Result<Vec<OhlcBar>> {
    let raw = load_ohlc_csv(path).with_context(|| format!("Failed to load {}", path))?;
    let (bars, report) = validate_bars(raw);
    if !report.all_passed() {
        for check in report.failed_checks() {
            info!(check = %check.name, details = ?check.details, "{}", check.message);
        }
    }
    anyhow::ensure!(!bars.is_empty(), "No usable bars in {}", path);
    Ok(bars)
}

fn print_indicator_table(records: &[IndicatorRecord]) {
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>7} {:>9} {:>6} {:>7} {:>10}",
        "Date", "Close", "SMA20", "SMA50", "RSI", "BBWidth", "BBPos", "Vol%", "MACD"
    );
    for r in records {
        println!(
            "{:<10} {:>10.5} {:>10} {:>10} {:>7} {:>9} {:>6} {:>7} {:>10.5}",
            r.date(),
            r.close(),
            cell(r.sma_20, 5),
            cell(r.sma_50, 5),
            cell(r.rsi, 1),
            cell(r.bb_width, 5),
            cell(r.bb_position, 2),
            cell(r.volatility, 2),
            r.macd,
        );
    }
}

fn cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}
