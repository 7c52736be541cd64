use analysis_core::{MarketInfo, MetricsError, StatementTable, ValuationParams, WaccResult};

use crate::primitives::{market_cap_equity, total_debt};

/// Cost of debt before the size tier is applied.
pub const BASE_COST_OF_DEBT: f64 = 0.055;
/// Cost of debt for issuers with less than [`LARGE_DEBT_THRESHOLD`] of debt.
pub const SMALL_DEBT_COST: f64 = 0.05;
/// Cost of debt for issuers at or above [`LARGE_DEBT_THRESHOLD`].
pub const LARGE_DEBT_COST: f64 = 0.06;
pub const LARGE_DEBT_THRESHOLD: f64 = 1_000_000_000.0;

/// Beta assumed when the provider does not report one.
pub const DEFAULT_BETA: f64 = 1.0;

/// Weighted average cost of capital from CAPM cost of equity and a
/// size-tiered cost of debt.
#[derive(Debug, Clone, Copy)]
pub struct WaccCalculator {
    params: ValuationParams,
}

impl WaccCalculator {
    pub fn new(params: ValuationParams) -> Self {
        Self { params }
    }

    /// CAPM: `Rf + beta * (Rm - Rf)`.
    pub fn cost_of_equity(&self, beta: Option<f64>) -> f64 {
        let beta = beta.filter(|b| b.is_finite()).unwrap_or(DEFAULT_BETA);
        self.params.risk_free_rate + beta * self.params.market_premium()
    }

    /// Simplified proxy for the credit spread: flat rate by debt size.
    pub fn cost_of_debt(total_debt: f64) -> f64 {
        if total_debt > 0.0 {
            if total_debt < LARGE_DEBT_THRESHOLD {
                SMALL_DEBT_COST
            } else {
                LARGE_DEBT_COST
            }
        } else {
            BASE_COST_OF_DEBT
        }
    }

    /// Compute WACC for one company.
    ///
    /// Faults (missing or malformed balance sheet) never escape: they come back
    /// as an empty result with `diagnostic` set.
    pub fn calculate(
        &self,
        info: &MarketInfo,
        balance_sheet: Option<&StatementTable>,
    ) -> WaccResult {
        match self.try_calculate(info, balance_sheet) {
            Ok((wacc, debt)) => WaccResult {
                wacc,
                total_debt: Some(debt),
                diagnostic: None,
            },
            Err(e) => {
                tracing::warn!("WACC calculation failed: {}", e);
                WaccResult {
                    wacc: None,
                    total_debt: None,
                    diagnostic: Some(format!("WACC: {}", e)),
                }
            }
        }
    }

    fn try_calculate(
        &self,
        info: &MarketInfo,
        balance_sheet: Option<&StatementTable>,
    ) -> Result<(Option<f64>, f64), MetricsError> {
        let balance_sheet = balance_sheet.ok_or_else(|| {
            MetricsError::ComputationFault("balance sheet not provided".to_string())
        })?;

        let cost_of_equity = self.cost_of_equity(info.beta);
        let debt = total_debt(balance_sheet)?;

        let equity = match market_cap_equity(info) {
            Ok(e) => e,
            Err(MetricsError::MetricUndefined(reason)) => {
                tracing::debug!("WACC undefined: {}", reason);
                return Ok((None, debt));
            }
            Err(e) => return Err(e),
        };

        let capital = equity + debt;
        if capital == 0.0 {
            return Ok((None, debt));
        }

        let cost_of_debt = Self::cost_of_debt(debt);
        let wacc = (equity / capital) * cost_of_equity
            + (debt / capital) * cost_of_debt * (1.0 - self.params.tax_rate);

        Ok((Some(wacc).filter(|w| w.is_finite()), debt))
    }
}

impl Default for WaccCalculator {
    fn default() -> Self {
        Self::new(ValuationParams::default())
    }
}
