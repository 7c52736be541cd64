//! Offline provider reading one JSON document per ticker from a directory.

use analysis_core::{DataProvider, MetricsError, RawFinancials};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::normalize;

/// Serves `<dir>/<TICKER>.json` files in the same format the HTTP endpoint returns.
#[derive(Debug, Clone)]
pub struct SnapshotDirProvider {
    dir: PathBuf,
}

impl SnapshotDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> Result<PathBuf, MetricsError> {
        if ticker.is_empty() || ticker.contains(['/', '\\']) || ticker.contains("..") {
            return Err(MetricsError::DataUnavailable(format!("invalid ticker '{}'", ticker)));
        }
        Ok(self.dir.join(format!("{}.json", ticker)))
    }
}

#[async_trait]
impl DataProvider for SnapshotDirProvider {
    async fn fetch_financials(&self, ticker: &str) -> Result<RawFinancials, MetricsError> {
        let path = self.path_for(ticker)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MetricsError::DataUnavailable(format!("ticker {} not found", ticker)));
            }
            Err(e) => {
                return Err(MetricsError::DataUnavailable(format!("{}: {}", path.display(), e)));
            }
        };

        let raw: RawFinancials = serde_json::from_str(&contents)
            .map_err(|e| MetricsError::InvalidData(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded snapshot for {} from {}", ticker, path.display());

        normalize(ticker, raw)
    }
}
