use analysis_core::{DataProvider, MetricsError, RawFinancials};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod snapshot;
pub use snapshot::SnapshotDirProvider;

const DEFAULT_RATE_LIMIT: usize = 60;
const MAX_ATTEMPTS: u32 = 3;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => {
                    (oldest + self.window).duration_since(now) + Duration::from_millis(50)
                }
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for market data slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// HTTP client for a JSON fundamentals endpoint.
///
/// `GET {base_url}/v1/financials/{TICKER}` must return a [`RawFinancials`]
/// document: market info under `info` and the three statements as
/// `{ "periods": [...], "items": { "<line item>": [values...] } }`.
#[derive(Clone)]
pub struct MarketDataClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    rate_limiter: RateLimiter,
}

impl MarketDataClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let rate_limit: usize = std::env::var("MARKET_DATA_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Build from `MARKET_DATA_URL` and the optional `MARKET_DATA_API_KEY`.
    pub fn from_env() -> Result<Self, MetricsError> {
        let base_url = std::env::var("MARKET_DATA_URL")
            .map_err(|_| MetricsError::Config("MARKET_DATA_URL must be set".to_string()))?;
        let api_key = std::env::var("MARKET_DATA_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Self::new(base_url, api_key))
    }

    /// Override the requests-per-minute budget.
    pub fn with_rate_limit(mut self, requests_per_minute: usize) -> Self {
        self.rate_limiter = RateLimiter::new(requests_per_minute, Duration::from_secs(60));
        self
    }

    /// `{base_url}/v1/financials/{ticker}`, with the ticker percent-encoded as
    /// a single path segment.
    fn financials_url(&self, ticker: &str) -> Result<Url, MetricsError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            MetricsError::Config(format!("invalid MARKET_DATA_URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                MetricsError::Config(format!(
                    "MARKET_DATA_URL '{}' cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v1", "financials", ticker]);
        Ok(url)
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, MetricsError> {
        let request = builder.build().map_err(|e| MetricsError::ApiError(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| MetricsError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| MetricsError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!(
                "Market data 429 rate limited, waiting {}s before retry {}/{}",
                wait_secs,
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(MetricsError::ApiError(format!(
            "Rate limited by market data provider after {} retries",
            MAX_ATTEMPTS
        )))
    }

    /// Fetch statements and market info for one ticker.
    pub async fn get_financials(&self, ticker: &str) -> Result<RawFinancials, MetricsError> {
        let mut builder = self.client.get(self.financials_url(ticker)?);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("apiKey", key)]);
        }

        let response = self.send_request(builder).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(MetricsError::DataUnavailable(format!("ticker {} not found", ticker)));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(MetricsError::ApiError(format!(
                    "HTTP {}: check MARKET_DATA_API_KEY",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(MetricsError::ApiError(format!(
                    "HTTP {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                )));
            }
            _ => {}
        }

        let raw: RawFinancials = response
            .json()
            .await
            .map_err(|e| MetricsError::InvalidData(format!("{}: {}", ticker, e)))?;

        normalize(ticker, raw)
    }
}

#[async_trait]
impl DataProvider for MarketDataClient {
    async fn fetch_financials(&self, ticker: &str) -> Result<RawFinancials, MetricsError> {
        self.get_financials(ticker).await
    }
}

/// Stamp the requested ticker on a payload and reject empty ones.
pub(crate) fn normalize(
    ticker: &str,
    mut raw: RawFinancials,
) -> Result<RawFinancials, MetricsError> {
    if !raw.has_data() {
        return Err(MetricsError::DataUnavailable(format!(
            "no financial data returned for {}",
            ticker
        )));
    }
    if raw.ticker.is_empty() {
        raw.ticker = ticker.to_string();
    }
    Ok(raw)
}
