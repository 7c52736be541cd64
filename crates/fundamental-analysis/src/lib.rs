use analysis_core::{
    line_items, CompanyMetrics, ErrorRecord, MetricResult, MetricsError, RawFinancials,
    StatementTable, TickerOutcome, ValuationParams,
};

pub mod growth;
pub mod primitives;
pub mod wacc;

pub use growth::{cagr, historical_growth, GROWTH_WINDOW};
pub use wacc::WaccCalculator;

use primitives::{capital_invested, latest_value, price_to_fcf, ratio, require};

/// Builds one [`CompanyMetrics`] record per ticker from raw provider data.
pub struct CompanyMetricsAggregator {
    params: ValuationParams,
    wacc_calculator: WaccCalculator,
}

impl CompanyMetricsAggregator {
    pub fn new(params: ValuationParams) -> Self {
        Self {
            params,
            wacc_calculator: WaccCalculator::new(params),
        }
    }

    pub fn params(&self) -> &ValuationParams {
        &self.params
    }

    /// Turn the outcome of a fetch into a report row.
    ///
    /// A failed fetch becomes an [`ErrorRecord`]; otherwise every metric is
    /// computed independently and failures only blank the affected field.
    pub fn evaluate(
        &self,
        ticker: &str,
        fetched: Result<RawFinancials, MetricsError>,
    ) -> TickerOutcome {
        match fetched {
            Ok(raw) => TickerOutcome::Metrics(Box::new(self.compute(ticker, &raw))),
            Err(e) => {
                tracing::warn!("No data for {}: {}", ticker, e);
                TickerOutcome::Error(ErrorRecord {
                    ticker: ticker.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }

    pub fn compute(&self, ticker: &str, raw: &RawFinancials) -> CompanyMetrics {
        let mut fields = FieldCollector::new(ticker);
        let info = &raw.info;

        let balance_sheet = raw.balance_sheet();
        let income_statement = raw.income_statement();
        let cash_flow = raw.cash_flow();

        // Free cash flow based valuation
        let free_cash_flow =
            fields.keep("free cash flow", lookup(&cash_flow, line_items::FREE_CASH_FLOW));
        let price_to_fcf = fields.keep(
            "P/FCF",
            price_to_fcf(info.current_price, free_cash_flow, info.shares_outstanding),
        );

        // Capital efficiency
        let ebit = fields.keep("EBIT", lookup(&income_statement, line_items::EBIT));
        let equity = fields.keep("equity", lookup(&balance_sheet, line_items::STOCKHOLDER_EQUITY));

        let wacc_result = self.wacc_calculator.calculate(info, raw.balance_sheet.as_ref());
        if let Some(diagnostic) = wacc_result.diagnostic {
            fields.diagnostics.push(diagnostic);
        }
        let wacc = wacc_result.wacc;
        let total_debt = wacc_result.total_debt;

        let capital_invested =
            fields.keep("capital invested", capital_invested(total_debt, equity));
        let roic = fields.keep("ROIC", self.roic(ebit, capital_invested));
        let eva = fields.keep("EVA", economic_value_added(roic, wacc, capital_invested));

        // Historical growth
        let revenue_growth =
            best_effort_growth(ticker, &income_statement, line_items::TOTAL_REVENUE);
        let eps_growth = best_effort_growth(ticker, &income_statement, line_items::NET_INCOME);
        let fcf_growth = best_effort_growth(ticker, &cash_flow, line_items::FREE_CASH_FLOW)
            .or_else(|| best_effort_growth(ticker, &cash_flow, line_items::OPERATING_CASH_FLOW));

        // Cash flow coverage of short-term obligations
        let operating_cash_flow = fields.keep(
            "operating cash flow",
            lookup(&cash_flow, line_items::OPERATING_CASH_FLOW),
        );
        let current_liabilities = fields.keep(
            "current liabilities",
            lookup(&balance_sheet, line_items::CURRENT_LIABILITIES),
        );
        let cash_flow_ratio = fields.keep(
            "cash flow ratio",
            require(operating_cash_flow, "operating cash flow").and_then(|ocf| {
                let liabilities = require(current_liabilities, "current liabilities")?;
                ratio(ocf, liabilities, "cash flow ratio")
            }),
        );

        CompanyMetrics {
            ticker: ticker.to_string(),
            name: info.long_name.clone().unwrap_or_else(|| ticker.to_string()),
            sector: info.sector.clone(),
            country: info.country.clone(),
            industry: info.industry.clone(),

            price: finite(info.current_price),
            pe_ratio: finite(info.trailing_pe),
            pb_ratio: finite(info.price_to_book),
            price_to_fcf,
            dividend_rate: finite(info.dividend_rate),
            dividend_yield: finite(info.dividend_yield),
            payout_ratio: finite(info.payout_ratio),

            roa: finite(info.return_on_assets),
            roe: finite(info.return_on_equity),

            current_ratio: finite(info.current_ratio),
            quick_ratio: finite(info.quick_ratio),
            cash_ratio: finite(info.cash_ratio),
            cash_flow_ratio,
            operating_cash_flow,
            current_liabilities,

            lt_debt_to_equity: finite(info.long_term_debt_to_equity),
            debt_to_equity: finite(info.debt_to_equity),

            operating_margin: finite(info.operating_margins),
            profit_margin: finite(info.profit_margins),

            wacc,
            total_debt,
            equity,
            capital_invested,
            roic,
            eva,

            revenue_growth,
            eps_growth,
            fcf_growth,

            diagnostics: fields.diagnostics,
        }
    }

    /// After-tax operating return on invested capital.
    pub fn roic(&self, ebit: Option<f64>, capital_invested: Option<f64>) -> MetricResult {
        let ebit = require(ebit, "EBIT")?;
        let capital = require(capital_invested, "capital invested")?;
        ratio(ebit * (1.0 - self.params.tax_rate), capital, "ROIC")
    }
}

impl Default for CompanyMetricsAggregator {
    fn default() -> Self {
        Self::new(ValuationParams::default())
    }
}

/// `(ROIC - WACC) * capital invested`.
pub fn economic_value_added(
    roic: Option<f64>,
    wacc: Option<f64>,
    capital_invested: Option<f64>,
) -> MetricResult {
    let roic = require(roic, "ROIC")?;
    let wacc = require(wacc, "WACC")?;
    let capital = require(capital_invested, "capital invested")?;
    Ok((roic - wacc) * capital)
}

fn lookup(table: &Result<&StatementTable, MetricsError>, item: &str) -> MetricResult {
    match table {
        Ok(table) => latest_value(table, item),
        Err(e) => Err(e.clone()),
    }
}

/// Growth metrics are informational: any failure just leaves the field empty.
fn best_effort_growth(
    ticker: &str,
    table: &Result<&StatementTable, MetricsError>,
    item: &str,
) -> Option<f64> {
    let result = match table {
        Ok(table) => historical_growth(table, item),
        Err(e) => Err(e.clone()),
    };
    match result {
        Ok(growth) => Some(growth),
        Err(e) => {
            tracing::debug!("{} growth of '{}' unavailable: {}", ticker, item, e);
            None
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Converts per-field results into record fields, keeping faults as diagnostics.
struct FieldCollector<'a> {
    ticker: &'a str,
    diagnostics: Vec<String>,
}

impl<'a> FieldCollector<'a> {
    fn new(ticker: &'a str) -> Self {
        Self {
            ticker,
            diagnostics: Vec::new(),
        }
    }

    fn keep(&mut self, field: &str, result: MetricResult) -> Option<f64> {
        match result {
            Ok(value) => Some(value),
            Err(MetricsError::MetricUndefined(reason)) => {
                tracing::debug!("{} {} undefined: {}", self.ticker, field, reason);
                None
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", self.ticker, field, e);
                self.diagnostics.push(format!("{}: {}", field, e));
                None
            }
        }
    }
}
