use analysis_core::{MetricResult, StatementTable, Undefined};

/// Number of most recent reported periods considered for growth rates.
pub const GROWTH_WINDOW: usize = 4;

/// Compound annual growth rate over `values`, given most recent first.
///
/// Uses at most [`GROWTH_WINDOW`] values. The oldest retained value is the
/// base and the number of compounding steps is `len - 1`.
pub fn cagr(values: &[f64], item: &str) -> MetricResult {
    let window = &values[..values.len().min(GROWTH_WINDOW)];
    if window.len() < 2 {
        return Err(Undefined::InsufficientHistory(item.to_string()).into());
    }

    let last = window[0];
    let first = window[window.len() - 1];
    let steps = (window.len() - 1) as f64;

    if first == 0.0 {
        return Err(Undefined::ZeroBase(item.to_string()).into());
    }

    let growth = (last / first).powf(1.0 / steps) - 1.0;
    if !growth.is_finite() {
        // Negative ratio under a fractional exponent (sign change over 2+ steps).
        return Err(Undefined::NonFiniteResult("growth rate").into());
    }
    Ok(growth)
}

/// CAGR of a statement line item over its recent reported history.
pub fn historical_growth(table: &StatementTable, item: &str) -> MetricResult {
    let values = table.values(item)?;
    cagr(&values, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::line_items;
    use approx::assert_relative_eq;

    fn revenue(values: Vec<Option<f64>>) -> StatementTable {
        StatementTable::new().with_item(line_items::TOTAL_REVENUE, values)
    }

    #[test]
    fn test_two_periods_doubling() {
        let table = revenue(vec![Some(200.0), Some(100.0)]);
        let growth = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap();
        assert_relative_eq!(growth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_steps() {
        // 100 -> 133.1 over three steps is 10% a year
        let table = revenue(vec![Some(133.1), Some(121.0), Some(110.0), Some(100.0)]);
        let growth = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap();
        assert_relative_eq!(growth, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_window_is_capped_at_four_periods() {
        // The fifth (oldest) value is outside the window.
        let table = revenue(vec![Some(133.1), Some(121.0), Some(110.0), Some(100.0), Some(1.0)]);
        let growth = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap();
        assert_relative_eq!(growth, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_periods_are_dropped_before_windowing() {
        let table = revenue(vec![Some(121.0), None, Some(110.0), None, Some(100.0)]);
        let growth = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap();
        assert_relative_eq!(growth, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_single_period_is_undefined() {
        let table = revenue(vec![Some(100.0), None]);
        let err = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap_err();
        assert!(!err.is_fault());
    }

    #[test]
    fn test_zero_base_is_undefined() {
        let table = revenue(vec![Some(100.0), Some(0.0)]);
        assert!(historical_growth(&table, line_items::TOTAL_REVENUE).is_err());
    }

    #[test]
    fn test_missing_line_item_is_undefined() {
        let err = historical_growth(&StatementTable::new(), line_items::NET_INCOME).unwrap_err();
        assert!(!err.is_fault());
    }

    #[test]
    fn test_sign_change_over_two_steps_is_undefined() {
        // (-50 / 100)^(1/2) has no real value.
        let table = revenue(vec![Some(-50.0), Some(10.0), Some(100.0)]);
        assert!(historical_growth(&table, line_items::TOTAL_REVENUE).is_err());
    }

    #[test]
    fn test_decline_over_one_step() {
        let table = revenue(vec![Some(-50.0), Some(100.0)]);
        let growth = historical_growth(&table, line_items::TOTAL_REVENUE).unwrap();
        assert_relative_eq!(growth, -1.5, epsilon = 1e-12);
    }
}
