use analysis_core::ValuationParams;
use analysis_orchestrator::{parse_tickers, DEFAULT_MAX_TICKERS, MAX_TICKERS};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICKERS: &str = "AAPL, MSFT, GOOGL, AMZN, TSLA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// WACC, ROIC, EVA, growth and liquidity metrics for a list of tickers.
#[derive(Parser, Debug)]
#[command(name = "valuation-report", author, version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated tickers, e.g. "AAPL, MSFT, GOOG"
    #[arg(short, long, default_value = DEFAULT_TICKERS)]
    pub tickers: String,

    /// Maximum number of tickers to analyze (1-100)
    #[arg(long, default_value_t = DEFAULT_MAX_TICKERS, value_parser = parse_max_tickers)]
    pub max_tickers: usize,

    /// Risk-free rate in percent [env: RISK_FREE_RATE, default: 4.35]
    #[arg(long)]
    pub risk_free: Option<f64>,

    /// Expected market return in percent [env: MARKET_RETURN, default: 8.5]
    #[arg(long)]
    pub market_return: Option<f64>,

    /// Corporate tax rate in percent [env: TAX_RATE, default: 21]
    #[arg(long)]
    pub tax_rate: Option<f64>,

    /// Read `<TICKER>.json` snapshots from this directory instead of the HTTP endpoint
    #[arg(long, env = "MARKET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the fundamentals endpoint
    #[arg(long, env = "MARKET_DATA_URL")]
    pub data_url: Option<String>,

    #[arg(long, env = "MARKET_DATA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Requests per minute allowed against the fundamentals endpoint
    #[arg(long)]
    pub rate_limit: Option<usize>,

    /// Pause between tickers, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub pacing_ms: u64,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn ticker_list(&self) -> Vec<String> {
        parse_tickers(&self.tickers, self.max_tickers)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Environment values overridden by any flags given, then range-checked.
    pub fn valuation_params(&self) -> anyhow::Result<ValuationParams> {
        let mut params = ValuationParams::from_env()?;
        if let Some(pct) = self.risk_free {
            params.risk_free_rate = pct / 100.0;
        }
        if let Some(pct) = self.market_return {
            params.market_return = pct / 100.0;
        }
        if let Some(pct) = self.tax_rate {
            params.tax_rate = pct / 100.0;
        }
        params.validate()?;
        Ok(params)
    }
}

fn parse_max_tickers(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (1..=MAX_TICKERS).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {}", MAX_TICKERS))
    }
}
