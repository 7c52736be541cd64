use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{MetricsError, Undefined, ValuationParams};

/// Statement line-item names as reported by the data provider.
pub mod line_items {
    pub const LONG_TERM_DEBT: &str = "Long Term Debt";
    pub const SHORT_TERM_DEBT: &str = "Short Term Debt";
    pub const STOCKHOLDER_EQUITY: &str = "Total Stockholder Equity";
    pub const CURRENT_LIABILITIES: &str = "Total Current Liabilities";
    pub const EBIT: &str = "EBIT";
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const NET_INCOME: &str = "Net Income";
    pub const FREE_CASH_FLOW: &str = "Free Cash Flow";
    pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";
}

/// One financial statement: line item name -> period values, most recent first.
///
/// `periods` holds the period end dates when the provider reports them. When it
/// is non-empty every row must have exactly one entry per period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    #[serde(default)]
    pub periods: Vec<NaiveDate>,
    #[serde(default)]
    pub items: BTreeMap<String, Vec<Option<f64>>>,
}

impl StatementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_periods(mut self, periods: Vec<NaiveDate>) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_item(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.items.insert(name.to_string(), values);
        self
    }

    /// The raw row for `name`, checked against the period axis.
    ///
    /// `Ok(None)` when the line item is not reported at all.
    pub fn row(&self, name: &str) -> Result<Option<&[Option<f64>]>, MetricsError> {
        let Some(row) = self.items.get(name) else {
            return Ok(None);
        };
        if !self.periods.is_empty() && row.len() != self.periods.len() {
            return Err(MetricsError::ComputationFault(format!(
                "line item '{}' has {} values for {} periods",
                name,
                row.len(),
                self.periods.len()
            )));
        }
        Ok(Some(row))
    }

    /// Non-missing, finite values of `name`, most recent first.
    pub fn values(&self, name: &str) -> Result<Vec<f64>, MetricsError> {
        let row = self
            .row(name)?
            .ok_or_else(|| Undefined::MissingLineItem(name.to_string()))?;
        Ok(row
            .iter()
            .filter_map(|v| *v)
            .filter(|v| v.is_finite())
            .collect())
    }
}

/// Market snapshot for a ticker. Keys follow the provider's quote summary naming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketInfo {
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,

    pub current_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub beta: Option<f64>,

    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,

    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,

    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub cash_ratio: Option<f64>,

    pub long_term_debt_to_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,

    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
}

/// Everything the provider returns for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinancials {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub info: MarketInfo,
    #[serde(default)]
    pub balance_sheet: Option<StatementTable>,
    #[serde(default)]
    pub income_statement: Option<StatementTable>,
    #[serde(default)]
    pub cash_flow: Option<StatementTable>,
}

impl RawFinancials {
    /// False when the provider answered but knew nothing about the ticker.
    pub fn has_data(&self) -> bool {
        let has_statements = [&self.balance_sheet, &self.income_statement, &self.cash_flow]
            .iter()
            .any(|t| t.as_ref().is_some_and(|t| !t.items.is_empty()));
        has_statements || self.info.current_price.is_some() || self.info.long_name.is_some()
    }

    pub fn balance_sheet(&self) -> Result<&StatementTable, MetricsError> {
        Self::table(&self.balance_sheet, "balance sheet")
    }

    pub fn income_statement(&self) -> Result<&StatementTable, MetricsError> {
        Self::table(&self.income_statement, "income statement")
    }

    pub fn cash_flow(&self) -> Result<&StatementTable, MetricsError> {
        Self::table(&self.cash_flow, "cash flow statement")
    }

    fn table<'a>(
        table: &'a Option<StatementTable>,
        label: &str,
    ) -> Result<&'a StatementTable, MetricsError> {
        table
            .as_ref()
            .ok_or_else(|| MetricsError::ComputationFault(format!("{} not provided", label)))
    }
}

/// Output of the WACC calculation.
///
/// `total_debt` is reported even when `wacc` cannot be computed. Both are
/// `None` when the calculation faulted, in which case `diagnostic` says why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaccResult {
    pub wacc: Option<f64>,
    pub total_debt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Complete per-company metrics record.
///
/// Ratios are fractions (0.25 == 25%). Amounts are in the reporting currency.
/// A `None` field means the metric could not be determined; it is never
/// stored as zero or NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,

    // Valuation
    pub price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub price_to_fcf: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,

    // Profitability
    pub roa: Option<f64>,
    pub roe: Option<f64>,

    // Liquidity
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub cash_ratio: Option<f64>,
    pub cash_flow_ratio: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub current_liabilities: Option<f64>,

    // Leverage
    pub lt_debt_to_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,

    // Margins
    pub operating_margin: Option<f64>,
    pub profit_margin: Option<f64>,

    // Capital efficiency
    pub wacc: Option<f64>,
    pub total_debt: Option<f64>,
    pub equity: Option<f64>,
    pub capital_invested: Option<f64>,
    pub roic: Option<f64>,
    pub eva: Option<f64>,

    // Historical growth (CAGR)
    pub revenue_growth: Option<f64>,
    pub eps_growth: Option<f64>,
    pub fcf_growth: Option<f64>,

    /// Faults hit while computing individual fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Produced instead of `CompanyMetrics` when a ticker's data could not be obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub ticker: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Metrics(Box<CompanyMetrics>),
    Error(ErrorRecord),
}

/// One row of a run, in input ticker order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub ticker: String,
    pub outcome: TickerOutcome,
}

impl TickerReport {
    pub fn metrics(&self) -> Option<&CompanyMetrics> {
        match &self.outcome {
            TickerOutcome::Metrics(m) => Some(m),
            TickerOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match &self.outcome {
            TickerOutcome::Metrics(_) => None,
            TickerOutcome::Error(e) => Some(e),
        }
    }
}

/// Results of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub params: ValuationParams,
    pub rows: Vec<TickerReport>,
}

impl AnalysisReport {
    pub fn successes(&self) -> impl Iterator<Item = &CompanyMetrics> {
        self.rows.iter().filter_map(TickerReport::metrics)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.rows.iter().filter_map(TickerReport::error)
    }
}
