use analysis_core::{AnalysisReport, CompanyMetrics};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::format::{format_amount, format_percent, format_price, format_ratio, NOT_AVAILABLE};

type CellFn = fn(&CompanyMetrics) -> Option<String>;

struct Column {
    header: &'static str,
    cell: CellFn,
}

fn column(header: &'static str, cell: CellFn) -> Column {
    Column { header, cell }
}

fn percent(v: Option<f64>) -> Option<String> {
    v.map(format_percent)
}

fn ratio(v: Option<f64>) -> Option<String> {
    v.map(format_ratio)
}

fn amount(v: Option<f64>) -> Option<String> {
    v.map(format_amount)
}

fn columns() -> Vec<Column> {
    vec![
        column("Ticker", |m| Some(m.ticker.clone())),
        column("Name", |m| Some(m.name.clone())),
        column("Sector", |m| m.sector.clone()),
        column("Country", |m| m.country.clone()),
        column("Industry", |m| m.industry.clone()),
        column("Price", |m| m.price.map(format_price)),
        column("P/E", |m| ratio(m.pe_ratio)),
        column("P/B", |m| ratio(m.pb_ratio)),
        column("P/FCF", |m| ratio(m.price_to_fcf)),
        column("Dividend Rate", |m| ratio(m.dividend_rate)),
        column("Dividend Yield %", |m| percent(m.dividend_yield)),
        column("Payout Ratio", |m| ratio(m.payout_ratio)),
        column("ROA", |m| percent(m.roa)),
        column("ROE", |m| percent(m.roe)),
        column("Current Ratio", |m| ratio(m.current_ratio)),
        column("Quick Ratio", |m| ratio(m.quick_ratio)),
        column("LtDebt/Eq", |m| ratio(m.lt_debt_to_equity)),
        column("Debt/Eq", |m| ratio(m.debt_to_equity)),
        column("Oper Margin", |m| percent(m.operating_margin)),
        column("Profit Margin", |m| percent(m.profit_margin)),
        column("WACC", |m| percent(m.wacc)),
        column("ROIC", |m| percent(m.roic)),
        column("EVA", |m| amount(m.eva)),
        column("Total Debt", |m| amount(m.total_debt)),
        column("Equity", |m| amount(m.equity)),
        column("Revenue Growth", |m| percent(m.revenue_growth)),
        column("EPS Growth", |m| percent(m.eps_growth)),
        column("FCF Growth", |m| percent(m.fcf_growth)),
        column("Cash Ratio", |m| ratio(m.cash_ratio)),
        column("Cash Flow Ratio", |m| ratio(m.cash_flow_ratio)),
        column("Operating Cash Flow", |m| amount(m.operating_cash_flow)),
        column("Current Liabilities", |m| amount(m.current_liabilities)),
    ]
}

/// Render successful rows as a table and failed tickers as a list below it.
///
/// Columns with no value for any company are left out.
pub fn render_table(report: &AnalysisReport) -> String {
    let companies: Vec<&CompanyMetrics> = report.successes().collect();
    let mut out = String::new();

    if companies.is_empty() {
        out.push_str("No valid data could be retrieved for any ticker.\n");
    } else {
        let cells: Vec<(&'static str, Vec<Option<String>>)> = columns()
            .into_iter()
            .map(|c| {
                let values: Vec<_> = companies.iter().map(|m| (c.cell)(*m)).collect();
                (c.header, values)
            })
            .filter(|(_, values)| values.iter().any(Option::is_some))
            .collect();

        let mut builder = Builder::default();
        builder.push_record(cells.iter().map(|(header, _)| header.to_string()));
        for row in 0..companies.len() {
            builder.push_record(cells.iter().map(|(_, values)| {
                values[row]
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            }));
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        out.push_str(&table.to_string());
        out.push('\n');
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        out.push_str("\nErrors:\n");
        for failure in failures {
            out.push_str(&format!("  {}: {}\n", failure.ticker, failure.error));
        }
    }

    out
}

pub fn render_json(report: &AnalysisReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{ErrorRecord, TickerOutcome, TickerReport, ValuationParams};

    fn metrics(ticker: &str, roe: Option<f64>) -> CompanyMetrics {
        CompanyMetrics {
            ticker: ticker.to_string(),
            name: format!("{} Inc.", ticker),
            price: Some(1234.5),
            roe,
            wacc: Some(0.0875),
            eva: Some(-340_000.0),
            ..Default::default()
        }
    }

    fn build_report(rows: Vec<TickerReport>) -> AnalysisReport {
        AnalysisReport {
            generated_at: Default::default(),
            params: ValuationParams::default(),
            rows,
        }
    }

    fn ok(m: CompanyMetrics) -> TickerReport {
        TickerReport {
            ticker: m.ticker.clone(),
            outcome: TickerOutcome::Metrics(Box::new(m)),
        }
    }

    fn failed(ticker: &str) -> TickerReport {
        TickerReport {
            ticker: ticker.to_string(),
            outcome: TickerOutcome::Error(ErrorRecord {
                ticker: ticker.to_string(),
                error: "ticker not found".to_string(),
            }),
        }
    }

    #[test]
    fn test_table_formats_and_placeholders() {
        let report = build_report(vec![ok(metrics("AAA", Some(0.0))), ok(metrics("BBB", None))]);
        let out = render_table(&report);

        assert!(out.contains("$1,234.50"));
        assert!(out.contains("8.75%"));
        assert!(out.contains("-340,000"));
        // ROE of zero is shown as a value, missing ROE as a placeholder.
        assert!(out.contains("0.00%"));
        assert!(out.contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_table_drops_empty_columns() {
        let report = build_report(vec![ok(metrics("AAA", None))]);
        let out = render_table(&report);
        assert!(out.contains("WACC"));
        assert!(!out.contains("ROE"));
        assert!(!out.contains("Sector"));
    }

    #[test]
    fn test_errors_listed_separately() {
        let report = build_report(vec![ok(metrics("AAA", None)), failed("ZZZ")]);
        let out = render_table(&report);
        assert!(out.contains("Errors:"));
        assert!(out.contains("ZZZ: ticker not found"));
    }

    #[test]
    fn test_no_valid_data() {
        let report = build_report(vec![failed("ZZZ")]);
        let out = render_table(&report);
        assert!(out.starts_with("No valid data"));
        assert!(out.contains("ZZZ"));
    }

    #[test]
    fn test_json_keeps_absent_fields_as_null() {
        let report = build_report(vec![ok(metrics("AAA", None))]);
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        let row = &json["rows"][0]["outcome"];
        assert_eq!(row["status"], "metrics");
        assert!(row["roe"].is_null());
        assert_eq!(row["wacc"], 0.0875);
    }
}
