//! End-to-end checks of the engine's public surface on worked examples.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use rpa_core::{InputField, InversionRequest, TaxEngine, TaxError, TaxInput};

#[test]
fn test_typical_payment_with_dependents() {
    let engine = TaxEngine::new();
    let input = TaxInput::new(dec!(5000.00), 2, dec!(5), true).unwrap();

    let summary = engine.compute_summary(&input).unwrap();

    assert_eq!(summary.contribution.amount, dec!(1000.00));
    assert_eq!(summary.income_tax.taxable_base, dec!(3620.82));
    assert_eq!(summary.income_tax.amount, dec!(172.72));
    assert_eq!(summary.service_tax.amount, dec!(250.00));
    assert_eq!(summary.total_tax, dec!(1422.72));
    assert_eq!(summary.net_amount, dec!(3577.28));
    assert_eq!(summary.total_tax_percent, dec!(28.45));
}

#[test]
fn test_contribution_ceiling() {
    let engine = TaxEngine::new();

    let at_ceiling = engine.compute_contribution(dec!(7786.02)).unwrap();
    let above = engine.compute_contribution(dec!(10000.00)).unwrap();

    assert_eq!(at_ceiling.amount, dec!(1557.20));
    assert_eq!(above.amount, dec!(1557.20));
}

#[test]
fn test_low_payment_owes_no_income_tax() {
    let engine = TaxEngine::new();
    let input = TaxInput::new(dec!(2000.00), 0, dec!(5), true).unwrap();

    let summary = engine.compute_summary(&input).unwrap();

    assert_eq!(summary.income_tax.amount, dec!(0));
    assert_eq!(summary.total_tax, dec!(500.00));
    assert_eq!(summary.net_amount, dec!(1500.00));
}

#[test]
fn test_gross_up_recovers_typical_payment() {
    let engine = TaxEngine::new();
    let request = InversionRequest::new(dec!(3577.28), 2, dec!(5), true).unwrap();

    let result = engine.solve_gross_from_net(&request).unwrap();

    assert!(result.converged);
    assert!((result.gross_amount_found - dec!(5000.00)).abs() <= dec!(0.05));
    assert!(result.net_difference.abs() <= dec!(0.01));
    assert_eq!(result.target_net_amount, dec!(3577.28));
}

#[test]
fn test_gross_up_for_higher_target() {
    let engine = TaxEngine::new();
    let request = InversionRequest::new(dec!(3891.27), 2, dec!(5), true).unwrap();

    let result = engine.solve_gross_from_net(&request).unwrap();

    assert!(result.converged);
    assert!((result.gross_amount_found - dec!(5533.73)).abs() <= dec!(0.05));

    // Forward check from the recovered gross.
    let input = TaxInput::new(result.gross_amount_found, 2, dec!(5), true).unwrap();
    let summary = engine.compute_summary(&input).unwrap();
    assert!((summary.net_amount - dec!(3891.27)).abs() <= dec!(0.01));
}

#[test]
fn test_entry_points_reject_invalid_input() {
    assert_eq!(
        TaxInput::new(dec!(1000000.01), 0, dec!(5), true),
        Err(TaxError::InvalidInput {
            field: InputField::GrossAmount,
            message: "gross amount is too high (maximum: 1000000.00)".to_string(),
        })
    );
    assert_eq!(
        InversionRequest::new(dec!(-5), 0, dec!(5), true)
            .unwrap_err()
            .field(),
        Some(InputField::NetAmount)
    );
}

#[test]
fn test_smallest_target_never_errors() {
    let engine = TaxEngine::new();

    for budget in [1, 10, 100] {
        let request = InversionRequest::new(dec!(0.01), 0, dec!(5), true)
            .unwrap()
            .with_max_iterations(budget)
            .unwrap();

        let result = engine.solve_gross_from_net(&request);

        assert!(result.is_ok(), "budget {budget}: {result:?}");
    }
}

#[test]
fn test_gross_up_inside_contribution_floor_band() {
    let engine = TaxEngine::new();
    let input = TaxInput::new(dec!(300.00), 0, dec!(0), true).unwrap();
    let net = engine.compute_summary(&input).unwrap().net_amount;
    assert_eq!(net, dec!(17.60));

    let request = InversionRequest::new(net, 0, dec!(0), true).unwrap();
    let result = engine.solve_gross_from_net(&request).unwrap();

    assert!(result.converged);
    assert_eq!(result.gross_amount_found, dec!(300.00));
}

#[test]
fn test_cache_can_be_inspected_and_cleared() {
    let engine = TaxEngine::with_cache_capacity(10);
    let input = TaxInput::new(dec!(5000), 2, dec!(5), true).unwrap();

    engine.compute_summary(&input).unwrap();
    engine.compute_summary(&input).unwrap();

    let stats = engine.cache_stats();
    assert_eq!(stats.len, 1);
    assert_eq!(stats.capacity, 10);
    assert_eq!(stats.hits, 1);

    engine.clear_cache();
    assert_eq!(engine.cache_stats().len, 0);
}

#[test]
fn test_summary_serializes_with_field_names() {
    let engine = TaxEngine::new();
    let input = TaxInput::new(dec!(5000.00), 2, dec!(5), true).unwrap();
    let summary = engine.compute_summary(&input).unwrap();

    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["net_amount"], "3577.28");
    assert_eq!(json["income_tax"]["rate_percent"], "15");
}
