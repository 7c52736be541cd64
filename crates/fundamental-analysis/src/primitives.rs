//! Scalar lookups and derivations from raw statement rows.
//!
//! Missing data never panics: lookups return `MetricsError::MetricUndefined`
//! for absent line items, and only malformed tables produce a fault.

use analysis_core::{line_items, MarketInfo, MetricResult, MetricsError, StatementTable, Undefined};

/// Turn an optional input into a metric result.
pub fn require(value: Option<f64>, name: &'static str) -> MetricResult {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(Undefined::MissingInput(name).into()),
    }
}

/// `numerator / denominator`, undefined when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64, label: &'static str) -> MetricResult {
    if denominator == 0.0 {
        return Err(Undefined::ZeroDenominator(label).into());
    }
    let value = numerator / denominator;
    if !value.is_finite() {
        return Err(Undefined::NonFiniteResult(label).into());
    }
    Ok(value)
}

/// Most recent reported value of a line item.
pub fn latest_value(table: &StatementTable, item: &str) -> MetricResult {
    table
        .values(item)?
        .first()
        .copied()
        .ok_or_else(|| Undefined::MissingLineItem(item.to_string()).into())
}

/// Like [`latest_value`], but an unreported line item counts as zero.
/// Faults still propagate.
pub fn latest_value_or_zero(table: &StatementTable, item: &str) -> MetricResult {
    match latest_value(table, item) {
        Err(MetricsError::MetricUndefined(_)) => Ok(0.0),
        other => other,
    }
}

/// Long-term plus short-term debt, each defaulting to zero.
pub fn total_debt(balance_sheet: &StatementTable) -> MetricResult {
    let long_term = latest_value_or_zero(balance_sheet, line_items::LONG_TERM_DEBT)?;
    let short_term = latest_value_or_zero(balance_sheet, line_items::SHORT_TERM_DEBT)?;
    if long_term < 0.0 || short_term < 0.0 {
        return Err(MetricsError::ComputationFault(format!(
            "negative debt reported (long term {}, short term {})",
            long_term, short_term
        )));
    }
    Ok(long_term + short_term)
}

/// Market value of equity, `price * shares outstanding`.
pub fn market_cap_equity(info: &MarketInfo) -> MetricResult {
    let price = require(info.current_price, "current price")?;
    let shares = require(info.shares_outstanding, "shares outstanding")?;
    Ok(price * shares)
}

/// Debt plus book equity.
///
/// Equity is required but missing debt counts as zero, following the debt-sum
/// policy. This means a company without reported debt is measured on equity
/// alone, which can overstate ROIC for leveraged firms with incomplete data.
pub fn capital_invested(total_debt: Option<f64>, equity: Option<f64>) -> MetricResult {
    let equity = require(equity, "stockholder equity")?;
    Ok(total_debt.filter(|d| d.is_finite()).unwrap_or(0.0) + equity)
}

pub fn fcf_per_share(free_cash_flow: Option<f64>, shares: Option<f64>) -> MetricResult {
    let fcf = require(free_cash_flow, "free cash flow")?;
    let shares = require(shares, "shares outstanding")?;
    ratio(fcf, shares, "free cash flow per share")
}

pub fn price_to_fcf(
    price: Option<f64>,
    free_cash_flow: Option<f64>,
    shares: Option<f64>,
) -> MetricResult {
    let price = require(price, "current price")?;
    let per_share = fcf_per_share(free_cash_flow, shares)?;
    ratio(price, per_share, "price to free cash flow")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn balance_sheet(long_term: Option<f64>, short_term: Option<f64>) -> StatementTable {
        let mut table = StatementTable::new();
        if let Some(v) = long_term {
            table = table.with_item(line_items::LONG_TERM_DEBT, vec![Some(v), Some(1.0)]);
        }
        if let Some(v) = short_term {
            table = table.with_item(line_items::SHORT_TERM_DEBT, vec![Some(v)]);
        }
        table
    }

    #[test]
    fn test_latest_value_skips_leading_gap() {
        let table =
            StatementTable::new().with_item(line_items::EBIT, vec![None, Some(42.0), Some(40.0)]);
        assert_relative_eq!(latest_value(&table, line_items::EBIT).unwrap(), 42.0);
    }

    #[test]
    fn test_latest_value_all_missing_is_undefined() {
        let table = StatementTable::new().with_item(line_items::EBIT, vec![None, None]);
        let err = latest_value(&table, line_items::EBIT).unwrap_err();
        assert!(!err.is_fault());
    }

    #[test]
    fn test_total_debt_sums_both_parts() {
        let table = balance_sheet(Some(800.0), Some(200.0));
        assert_relative_eq!(total_debt(&table).unwrap(), 1000.0);
    }

    #[test]
    fn test_total_debt_missing_parts_default_to_zero() {
        assert_relative_eq!(total_debt(&balance_sheet(Some(500.0), None)).unwrap(), 500.0);
        assert_relative_eq!(total_debt(&balance_sheet(None, Some(75.0))).unwrap(), 75.0);
        assert_eq!(total_debt(&balance_sheet(None, None)).unwrap(), 0.0);
    }

    #[test]
    fn test_total_debt_negative_is_fault() {
        let err = total_debt(&balance_sheet(Some(-5.0), None)).unwrap_err();
        assert!(err.is_fault());
    }

    #[test]
    fn test_market_cap_equity() {
        let info = MarketInfo {
            current_price: Some(150.0),
            shares_outstanding: Some(1_000_000.0),
            ..Default::default()
        };
        assert_relative_eq!(market_cap_equity(&info).unwrap(), 150_000_000.0);

        let no_shares = MarketInfo {
            current_price: Some(150.0),
            ..Default::default()
        };
        assert!(market_cap_equity(&no_shares).is_err());

        let no_price = MarketInfo {
            shares_outstanding: Some(1_000_000.0),
            ..Default::default()
        };
        assert!(market_cap_equity(&no_price).is_err());
    }

    #[test]
    fn test_capital_invested_requires_equity_only() {
        assert_relative_eq!(capital_invested(Some(2_000.0), Some(3_000.0)).unwrap(), 5_000.0);
        assert_relative_eq!(capital_invested(None, Some(3_000.0)).unwrap(), 3_000.0);
        assert!(capital_invested(Some(2_000.0), None).is_err());
    }

    #[test]
    fn test_price_to_fcf() {
        // FCF/share = 10, price 150 -> 15x
        let pfcf = price_to_fcf(Some(150.0), Some(1_000_000.0), Some(100_000.0)).unwrap();
        assert_relative_eq!(pfcf, 15.0);
    }

    #[test]
    fn test_price_to_fcf_degenerate_inputs() {
        assert!(price_to_fcf(Some(150.0), None, Some(100.0)).is_err());
        assert!(price_to_fcf(Some(150.0), Some(1_000.0), None).is_err());
        assert!(price_to_fcf(Some(150.0), Some(1_000.0), Some(0.0)).is_err());
        assert!(price_to_fcf(Some(150.0), Some(0.0), Some(100.0)).is_err());
        assert!(price_to_fcf(None, Some(1_000.0), Some(100.0)).is_err());
    }
}
