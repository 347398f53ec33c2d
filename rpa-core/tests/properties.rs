//! Property tests over the forward calculation and its inverse.

use proptest::prelude::{any, prop_assert, prop_assert_eq, prop_assume, proptest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rpa_core::calculations::common::round_half_up;
use rpa_core::{InversionRequest, RateSchedule, TaxEngine, TaxInput};

fn cents(value: u32) -> Decimal {
    Decimal::new(i64::from(value), 2)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn prop_contribution_stays_between_floor_and_cap(gross in 1u32..100_000_000) {
        let engine = TaxEngine::new();
        let schedule = RateSchedule::CURRENT;

        let amount = engine.compute_contribution(cents(gross)).unwrap().amount;

        prop_assert!(amount >= round_half_up(schedule.contribution_floor()));
        prop_assert!(amount <= round_half_up(schedule.contribution_cap()));
    }

    #[test]
    fn prop_totals_are_exact(
        gross in 1u32..100_000_000,
        dependents in 0i32..=20,
        rate in 0u32..=10_000,
        include in any::<bool>()
    ) {
        let engine = TaxEngine::new();
        let input = TaxInput::new(cents(gross), dependents, cents(rate), include).unwrap();

        let summary = engine.compute_summary(&input).unwrap();

        prop_assert_eq!(
            summary.total_tax,
            summary.contribution.amount + summary.income_tax.amount + summary.service_tax.amount
        );
        prop_assert_eq!(summary.net_amount, summary.gross_amount - summary.total_tax);
        prop_assert_eq!(summary.total_tax, round_half_up(summary.total_tax));
        prop_assert!(summary.income_tax.amount >= Decimal::ZERO);
    }

    #[test]
    fn prop_total_tax_never_falls_as_gross_rises(
        gross in 1u32..50_000_000,
        step in 1u32..1_000_000,
        dependents in 0i32..=20,
        rate in 0u32..=10_000,
        include in any::<bool>()
    ) {
        let engine = TaxEngine::with_cache_capacity(0);
        let lower = TaxInput::new(cents(gross), dependents, cents(rate), include).unwrap();
        let higher = TaxInput::new(cents(gross + step), dependents, cents(rate), include).unwrap();

        let lower = engine.compute_summary(&lower).unwrap();
        let higher = engine.compute_summary(&higher).unwrap();

        prop_assert!(higher.total_tax >= lower.total_tax);
    }

    #[test]
    fn prop_cache_does_not_change_results(
        gross in 1u32..100_000_000,
        dependents in 0i32..=20,
        rate in 0u32..=10_000,
        include in any::<bool>()
    ) {
        let cached = TaxEngine::new();
        let uncached = TaxEngine::with_cache_capacity(0);
        let input = TaxInput::new(cents(gross), dependents, cents(rate), include).unwrap();

        let first = cached.compute_summary(&input).unwrap();
        let second = cached.compute_summary(&input).unwrap();
        let fresh = uncached.compute_summary(&input).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(128))]

    #[test]
    fn prop_gross_up_round_trips(
        gross in 1u32..100_000_000,
        dependents in 0i32..=20,
        rate in 0u32..=10,
        include in any::<bool>()
    ) {
        let engine = TaxEngine::new();
        let gross = cents(gross);
        let rate = Decimal::from(rate);
        let input = TaxInput::new(gross, dependents, rate, include).unwrap();
        let net = engine.compute_summary(&input).unwrap().net_amount;
        prop_assume!(net > Decimal::ZERO);

        let request = InversionRequest::new(net, dependents, rate, include).unwrap();
        let result = engine.solve_gross_from_net(&request).unwrap();

        prop_assert!(result.converged);
        prop_assert!(result.net_difference.abs() <= dec!(0.01));
        prop_assert!((result.gross_amount_found - gross).abs() <= dec!(0.05));
    }

    #[test]
    fn prop_gross_up_round_trips_in_floor_band(
        gross in 28_300u32..141_200,
        dependents in 0i32..=20,
        rate in 0u32..=800,
        include in any::<bool>()
    ) {
        let engine = TaxEngine::new();
        let gross = cents(gross);
        let rate = cents(rate);
        let input = TaxInput::new(gross, dependents, rate, include).unwrap();
        let net = engine.compute_summary(&input).unwrap().net_amount;
        prop_assume!(net > Decimal::ZERO);

        let request = InversionRequest::new(net, dependents, rate, include).unwrap();
        let result = engine.solve_gross_from_net(&request).unwrap();

        prop_assert!(result.converged);
        prop_assert!(result.net_difference.abs() <= dec!(0.01));
    }
}
