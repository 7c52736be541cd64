//! valuation-report: compute WACC, ROIC, EVA, growth and liquidity metrics per ticker.
//!
//! Usage:
//!   cargo run -p valuation-report -- --tickers "AAPL, MSFT, GOOGL"
//!   cargo run -p valuation-report -- --data-dir ./demos/snapshots --format json
//!   cargo run -p valuation-report -- --risk-free 4 --market-return 9 --tax-rate 25

mod cli;
mod format;
mod presenter;

use analysis_core::{DataProvider, TickerReport};
use analysis_orchestrator::{AnalysisOrchestrator, ProgressObserver};
use clap::Parser;
use cli::{Cli, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use market_data_client::{MarketDataClient, SnapshotDirProvider};
use std::sync::Arc;

/// Progress bar driven by the orchestrator's per-ticker callbacks.
struct BarObserver {
    bar: Option<ProgressBar>,
}

impl BarObserver {
    fn new(total: usize, enabled: bool) -> anyhow::Result<Self> {
        if !enabled {
            return Ok(Self { bar: None });
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")?
                .progress_chars("##-"),
        );
        Ok(Self { bar: Some(bar) })
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressObserver for BarObserver {
    fn on_start(&mut self, ticker: &str, index: usize, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Processing {} ({}/{})", ticker, index + 1, total));
        }
    }

    fn on_finish(&mut self, _report: &TickerReport) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

fn build_provider(cli: &Cli) -> anyhow::Result<Arc<dyn DataProvider>> {
    if let Some(dir) = &cli.data_dir {
        tracing::info!("Reading snapshots from {}", dir.display());
        return Ok(Arc::new(SnapshotDirProvider::new(dir)));
    }

    let client = match &cli.data_url {
        Some(url) => MarketDataClient::new(url.clone(), cli.api_key.clone()),
        None => MarketDataClient::from_env()?,
    };
    let client = match cli.rate_limit {
        Some(rpm) => client.with_rate_limit(rpm),
        None => client,
    };
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valuation_report=info,market_data_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let params = cli.valuation_params()?;

    let tickers = cli.ticker_list();
    if tickers.is_empty() {
        anyhow::bail!("enter at least one ticker");
    }

    tracing::info!(
        "Rf={:.2}% Rm={:.2}% Tc={:.2}%",
        params.risk_free_rate * 100.0,
        params.market_return * 100.0,
        params.tax_rate * 100.0
    );

    let provider = build_provider(&cli)?;
    let orchestrator = AnalysisOrchestrator::new(provider, params).with_pacing(cli.pacing());

    let mut progress = BarObserver::new(tickers.len(), !cli.no_progress)?;
    let report = orchestrator.run(&tickers, &mut progress).await;
    progress.finish();

    match cli.format {
        OutputFormat::Table => print!("{}", presenter::render_table(&report)),
        OutputFormat::Json => println!("{}", presenter::render_json(&report)?),
    }

    if report.successes().next().is_none() {
        anyhow::bail!("no valid data could be retrieved for any ticker");
    }

    Ok(())
}
