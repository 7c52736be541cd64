use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const ACME: &str = r#"{
    "info": {
        "longName": "Acme Corporation",
        "currentPrice": 50.0,
        "sharesOutstanding": 1000,
        "beta": 1.0
    },
    "balance_sheet": {
        "items": {
            "Long Term Debt": [10000.0],
            "Total Stockholder Equity": [5000.0],
            "Total Current Liabilities": [2000.0]
        }
    },
    "income_statement": {
        "items": {
            "EBIT": [1000.0],
            "Total Revenue": [200.0, 100.0]
        }
    },
    "cash_flow": {
        "items": {
            "Operating Cash Flow": [3000.0]
        }
    }
}"#;

fn command(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("valuation-report").unwrap();
    cmd.env_remove("RISK_FREE_RATE")
        .env_remove("MARKET_RETURN")
        .env_remove("TAX_RATE")
        .env_remove("MARKET_DATA_URL")
        .env("MARKET_DATA_DIR", dir)
        .args(["--pacing-ms", "0", "--no-progress"]);
    cmd
}

#[test]
fn test_table_report_from_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ACME.json"), ACME).unwrap();

    command(dir.path())
        .args(["--tickers", "acme, nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corporation"))
        .stdout(predicate::str::contains("$50.00"))
        .stdout(predicate::str::contains("100.00%"))
        .stdout(predicate::str::contains("Errors:"))
        .stdout(predicate::str::contains("NOPE"));
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ACME.json"), ACME).unwrap();

    let output = command(dir.path())
        .args(["--tickers", "ACME", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let row = &json["rows"][0]["outcome"];
    assert_eq!(row["status"], "metrics");
    assert_eq!(row["ticker"], "ACME");
    assert_eq!(row["cash_flow_ratio"], 1.5);
    assert!(row["fcf_growth"].is_null());
}

#[test]
fn test_all_tickers_failing_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    command(dir.path())
        .args(["--tickers", "NOPE"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No valid data"));
}

#[test]
fn test_empty_ticker_list_rejected() {
    let dir = tempfile::tempdir().unwrap();

    command(dir.path())
        .args(["--tickers", " , "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one ticker"));
}

#[test]
fn test_out_of_range_tax_rate_rejected() {
    let dir = tempfile::tempdir().unwrap();

    command(dir.path())
        .args(["--tickers", "ACME", "--tax-rate", "75"])
        .assert()
        .failure();
}
