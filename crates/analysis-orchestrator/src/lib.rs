use analysis_core::{AnalysisReport, DataProvider, TickerReport, ValuationParams};
use chrono::Utc;
use fundamental_analysis::CompanyMetricsAggregator;
use std::time::Duration;

pub mod tickers;
pub use tickers::{parse_tickers, DEFAULT_MAX_TICKERS, MAX_TICKERS};

/// Delay between provider calls, to stay under upstream rate limits.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Receives progress updates while a run is in flight.
pub trait ProgressObserver {
    /// Called before fetching the `index`-th ticker (0-based) out of `total`.
    fn on_start(&mut self, _ticker: &str, _index: usize, _total: usize) {}

    /// Called once the ticker's row has been produced.
    fn on_finish(&mut self, _report: &TickerReport) {}
}

impl ProgressObserver for () {}

/// Fetches each ticker in turn and turns the data into report rows.
pub struct AnalysisOrchestrator<P> {
    provider: P,
    aggregator: CompanyMetricsAggregator,
    pacing: Duration,
}

impl<P: DataProvider> AnalysisOrchestrator<P> {
    pub fn new(provider: P, params: ValuationParams) -> Self {
        Self {
            provider,
            aggregator: CompanyMetricsAggregator::new(params),
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn params(&self) -> &ValuationParams {
        self.aggregator.params()
    }

    /// Analyze a single ticker. Never fails: retrieval errors become an error row.
    pub async fn analyze(&self, ticker: &str) -> TickerReport {
        let fetched = self.provider.fetch_financials(ticker).await;
        TickerReport {
            ticker: ticker.to_string(),
            outcome: self.aggregator.evaluate(ticker, fetched),
        }
    }

    /// Analyze `tickers` sequentially, pausing between provider calls.
    ///
    /// Rows come back in input order, one per ticker.
    pub async fn run<O: ProgressObserver>(
        &self,
        tickers: &[String],
        observer: &mut O,
    ) -> AnalysisReport {
        let total = tickers.len();
        tracing::info!("Analyzing {} tickers", total);

        let mut rows = Vec::with_capacity(total);
        for (index, ticker) in tickers.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            observer.on_start(ticker, index, total);
            tracing::info!("Processing {} ({}/{})", ticker, index + 1, total);

            let report = self.analyze(ticker).await;
            observer.on_finish(&report);
            rows.push(report);
        }

        let failed = rows.iter().filter(|r| r.error().is_some()).count();
        tracing::info!("Analysis complete: {}/{} tickers succeeded", total - failed, total);

        AnalysisReport {
            generated_at: Utc::now(),
            params: *self.params(),
            rows,
        }
    }
}
