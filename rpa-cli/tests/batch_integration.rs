//! Integration tests that run the batch path against an on-disk fixture file.
//!
//! The unit tests inside batch.rs use inline strings; these cover reading
//! from disk, computing through a real engine and writing results back out.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rpa_cli::batch::{self, BatchLoadError, BatchTotals};
use rpa_cli::config::Config;
use rpa_core::TaxEngine;
use rust_decimal_macros::dec;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("payments.csv")
}

#[test]
fn test_load_fixture_file_succeeds() {
    let inputs = batch::load_from_file(&fixture_path()).expect("fixture should load");

    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs[2].service_tax_rate(), dec!(5));
    assert!(!inputs[2].include_service_tax());
    assert!(inputs[3].include_service_tax());
}

#[test]
fn test_fixture_totals() {
    let engine = TaxEngine::new();
    let inputs = batch::load_from_file(&fixture_path()).unwrap();

    let report = batch::compute(&engine, &inputs).unwrap();

    assert_eq!(
        report.totals,
        BatchTotals {
            count: 4,
            total_gross: dec!(24786.02),
            total_tax: dec!(7641.20),
            total_net: dec!(17144.82),
        }
    );
}

#[test]
fn test_fixture_rows() {
    let engine = TaxEngine::new();
    let inputs = batch::load_from_file(&fixture_path()).unwrap();

    let records = batch::compute(&engine, &inputs).unwrap().records;

    assert_eq!(records[0].net_amount, dec!(3577.28));
    assert_eq!(records[1].contribution, dec!(1557.20));
    assert_eq!(records[1].income_tax, dec!(827.97));
    assert_eq!(records[1].service_tax, dec!(389.30));
    assert_eq!(records[2].income_tax, dec!(1436.81));
    assert_eq!(records[2].service_tax, dec!(0));
    assert_eq!(records[3].service_tax, dec!(50.00));
}

#[test]
fn test_results_round_trip_through_csv_file() {
    let engine = TaxEngine::new();
    let inputs = batch::load_from_file(&fixture_path()).unwrap();
    let report = batch::compute(&engine, &inputs).unwrap();

    let out_path = std::env::temp_dir().join(format!("rpa-batch-{}.csv", std::process::id()));
    let file = std::fs::File::create(&out_path).unwrap();
    batch::write_records(file, &report.records).unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    std::fs::remove_file(&out_path).unwrap();

    // Header plus one line per input row.
    assert_eq!(written.lines().count(), 5);
    assert!(written.lines().nth(1).unwrap().ends_with("3577.28,28.45"));

    // The output is itself valid batch input.
    let reloaded = batch::load_from_str(&written).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded[0].gross_amount(), dec!(5000.00));
}

#[test]
fn test_missing_file_reports_path() {
    let err = batch::load_from_file(Path::new("/nonexistent/payments.csv")).unwrap_err();

    assert!(matches!(err, BatchLoadError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/payments.csv"));
}

#[test]
fn test_config_capacity_drives_engine() {
    let config = Config::from_toml_str("[engine]\ncache_capacity = 2\n").unwrap();
    let engine = TaxEngine::with_cache_capacity(config.engine.cache_capacity);
    let inputs = batch::load_from_file(&fixture_path()).unwrap();

    batch::compute(&engine, &inputs).unwrap();

    assert_eq!(engine.cache_stats().len, 2);
}
