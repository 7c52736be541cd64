use serde::{Deserialize, Serialize};

use crate::MetricsError;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0435;
pub const DEFAULT_MARKET_RETURN: f64 = 0.085;
pub const DEFAULT_TAX_RATE: f64 = 0.21;

/// Capital-market assumptions shared by every ticker in a run.
///
/// All values are fractions (0.0435 == 4.35%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationParams {
    pub risk_free_rate: f64,
    pub market_return: f64,
    pub tax_rate: f64,
}

impl Default for ValuationParams {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            market_return: DEFAULT_MARKET_RETURN,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl ValuationParams {
    /// Build from percentages, the way users type them (4.35 == 4.35%).
    pub fn from_percent(risk_free_pct: f64, market_return_pct: f64, tax_pct: f64) -> Self {
        Self {
            risk_free_rate: risk_free_pct / 100.0,
            market_return: market_return_pct / 100.0,
            tax_rate: tax_pct / 100.0,
        }
    }

    /// Read `RISK_FREE_RATE`, `MARKET_RETURN` and `TAX_RATE` (in percent),
    /// keeping the default for any variable that is unset.
    pub fn from_env() -> Result<Self, MetricsError> {
        let defaults = Self::default();
        Ok(Self {
            risk_free_rate: env_percent("RISK_FREE_RATE")?.unwrap_or(defaults.risk_free_rate),
            market_return: env_percent("MARKET_RETURN")?.unwrap_or(defaults.market_return),
            tax_rate: env_percent("TAX_RATE")?.unwrap_or(defaults.tax_rate),
        })
    }

    /// Equity risk premium, `Rm - Rf`.
    pub fn market_premium(&self) -> f64 {
        self.market_return - self.risk_free_rate
    }

    /// Reject values outside the ranges the report accepts as input:
    /// risk-free 0-20%, market return 0-30%, tax 0-50%.
    ///
    /// The metrics engine itself never calls this.
    pub fn validate(&self) -> Result<(), MetricsError> {
        check_range("risk-free rate", self.risk_free_rate, 0.20)?;
        check_range("market return", self.market_return, 0.30)?;
        check_range("tax rate", self.tax_rate, 0.50)?;
        Ok(())
    }
}

fn env_percent(key: &str) -> Result<Option<f64>, MetricsError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(|pct| Some(pct / 100.0))
            .map_err(|_| MetricsError::Config(format!("{} must be a number, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

fn check_range(label: &str, value: f64, max: f64) -> Result<(), MetricsError> {
    if !value.is_finite() || !(0.0..=max).contains(&value) {
        return Err(MetricsError::Config(format!(
            "{} must be between 0% and {:.0}%, got {:.2}%",
            label,
            max * 100.0,
            value * 100.0
        )));
    }
    Ok(())
}
