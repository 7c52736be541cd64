use async_trait::async_trait;
use std::sync::Arc;

use crate::{MetricsError, RawFinancials};

/// Source of raw statement and market data for a ticker.
///
/// Implementations return `MetricsError::DataUnavailable` when the ticker
/// cannot be resolved and `MetricsError::ApiError` for transport failures.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch_financials(&self, ticker: &str) -> Result<RawFinancials, MetricsError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn fetch_financials(&self, ticker: &str) -> Result<RawFinancials, MetricsError> {
        (**self).fetch_financials(ticker).await
    }
}
