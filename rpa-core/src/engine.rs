//! Entry point owning the rate schedule and the summary cache.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::debug;

use crate::cache::{CacheStats, DEFAULT_CACHE_CAPACITY, SummaryCache, SummaryKey};
use crate::calculations::common::round_half_up;
use crate::calculations::{
    ContributionCalculator, GrossUpSolver, IncomeTaxCalculator, ServiceTaxCalculator,
    SummaryCalculator,
};
use crate::error::{RateScheduleError, TaxError};
use crate::models::{
    ContributionResult, IncomeTaxResult, InversionRequest, InversionResult, RateSchedule,
    ServiceTaxResult, TaxInput, TaxSummary,
};

/// Withholding engine for contractor payments.
///
/// Summaries are memoized in a FIFO-bounded cache behind a mutex, so one
/// engine can be shared between threads.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rpa_core::{InversionRequest, TaxEngine, TaxInput};
///
/// let engine = TaxEngine::new();
///
/// let input = TaxInput::new(dec!(5000.00), 2, dec!(5), true).unwrap();
/// let summary = engine.compute_summary(&input).unwrap();
/// assert_eq!(summary.net_amount, dec!(3577.28));
///
/// let request = InversionRequest::new(summary.net_amount, 2, dec!(5), true).unwrap();
/// let found = engine.solve_gross_from_net(&request).unwrap();
/// assert!(found.converged);
/// assert!((found.gross_amount_found - dec!(5000.00)).abs() <= dec!(0.05));
/// ```
#[derive(Debug)]
pub struct TaxEngine {
    schedule: RateSchedule,
    cache: Mutex<SummaryCache>,
}

impl TaxEngine {
    /// Engine on [`RateSchedule::CURRENT`] with the default cache capacity.
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Engine keeping at most `capacity` summaries. Zero disables caching.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            schedule: RateSchedule::CURRENT,
            cache: Mutex::new(SummaryCache::new(capacity)),
        }
    }

    /// Replaces the rate schedule after validating it.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateScheduleError`] found in `schedule`.
    pub fn with_schedule(
        mut self,
        schedule: RateSchedule,
    ) -> Result<Self, RateScheduleError> {
        schedule.validate()?;
        self.schedule = schedule;
        self.cache_guard().clear();
        Ok(self)
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive.
    pub fn compute_contribution(
        &self,
        gross_amount: Decimal,
    ) -> Result<ContributionResult, TaxError> {
        ContributionCalculator::new(&self.schedule).calculate(gross_amount)
    }

    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive
    /// or `dependents` is outside `0..=20`.
    pub fn compute_income_tax(
        &self,
        gross_amount: Decimal,
        dependents: i32,
    ) -> Result<IncomeTaxResult, TaxError> {
        IncomeTaxCalculator::new(&self.schedule).calculate(gross_amount, dependents)
    }

    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive
    /// or too large to tax, or `rate_percent` is outside `0..=100`.
    pub fn compute_service_tax(
        &self,
        gross_amount: Decimal,
        rate_percent: Decimal,
    ) -> Result<ServiceTaxResult, TaxError> {
        ServiceTaxCalculator::new().calculate(gross_amount, rate_percent)
    }

    /// Full breakdown for `input`, served from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] if a calculator precondition fails.
    pub fn compute_summary(
        &self,
        input: &TaxInput,
    ) -> Result<TaxSummary, TaxError> {
        self.summarize(
            input.gross_amount(),
            input.dependents(),
            input.service_tax_rate(),
            input.include_service_tax(),
        )
    }

    /// Searches for the gross amount whose net amount meets the request's
    /// target. Non-convergence is reported in the result, not as an error.
    ///
    /// # Errors
    ///
    /// Only fails if the best estimate found cannot be summarized.
    pub fn solve_gross_from_net(
        &self,
        request: &InversionRequest,
    ) -> Result<InversionResult, TaxError> {
        GrossUpSolver::new(self).solve(request)
    }

    pub fn clear_cache(&self) {
        self.cache_guard().clear();
        debug!("summary cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache_guard().stats()
    }

    /// Canonical keys of the cached summaries, oldest first.
    pub fn cache_keys(&self) -> Vec<String> {
        self.cache_guard().keys()
    }

    /// Cached summary on raw parts; the gross amount is rounded to cents
    /// before it becomes part of the key.
    pub(crate) fn summarize(
        &self,
        gross_amount: Decimal,
        dependents: u8,
        service_tax_rate: Decimal,
        include_service_tax: bool,
    ) -> Result<TaxSummary, TaxError> {
        let gross_amount = round_half_up(gross_amount);
        let key = SummaryKey::new(
            gross_amount,
            dependents,
            service_tax_rate,
            include_service_tax,
        );

        if let Some(summary) = self.cache_guard().get(&key) {
            return Ok(summary);
        }

        // The lock is not held while computing. Two threads missing on one
        // key may both compute it; `insert` keeps the first and drops the other.
        let summary = SummaryCalculator::new(&self.schedule).summarize(
            gross_amount,
            dependents,
            service_tax_rate,
            include_service_tax,
        )?;
        self.cache_guard().insert(key, summary.clone());

        Ok(summary)
    }

    fn cache_guard(&self) -> MutexGuard<'_, SummaryCache> {
        // The cache holds plain data; a panic elsewhere cannot leave it torn.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TaxEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::InputField;
    use crate::models::TaxBracket;

    fn input(gross: Decimal) -> TaxInput {
        TaxInput::new(gross, 2, dec!(5), true).unwrap()
    }

    // =========================================================================
    // component entry points
    // =========================================================================

    #[test]
    fn component_entry_points_match_summary() {
        let engine = TaxEngine::new();
        let summary = engine.compute_summary(&input(dec!(5000.00))).unwrap();

        assert_eq!(
            engine.compute_contribution(dec!(5000.00)).unwrap(),
            summary.contribution
        );
        assert_eq!(
            engine.compute_income_tax(dec!(5000.00), 2).unwrap(),
            summary.income_tax
        );
        assert_eq!(
            engine.compute_service_tax(dec!(5000.00), dec!(5)).unwrap(),
            summary.service_tax
        );
    }

    #[test]
    fn service_tax_overflow_is_an_error() {
        let engine = TaxEngine::new();

        let err = engine.compute_service_tax(Decimal::MAX, dec!(100)).unwrap_err();

        assert_eq!(err.field(), Some(InputField::GrossAmount));
    }

    // =========================================================================
    // caching
    // =========================================================================

    #[test]
    fn repeated_summary_is_served_from_cache() {
        let engine = TaxEngine::new();

        let first = engine.compute_summary(&input(dec!(5000))).unwrap();
        let second = engine.compute_summary(&input(dec!(5000.00))).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            engine.cache_stats(),
            CacheStats {
                len: 1,
                capacity: 100,
                hits: 1,
                misses: 1,
            }
        );
        assert_eq!(engine.cache_keys(), vec!["5000:2:5:true"]);
    }

    #[test]
    fn disabled_cache_gives_same_results() {
        let cached = TaxEngine::new();
        let uncached = TaxEngine::with_cache_capacity(0);

        for gross in [dec!(900), dec!(3000.10), dec!(5000), dec!(12345.67)] {
            assert_eq!(
                cached.compute_summary(&input(gross)).unwrap(),
                uncached.compute_summary(&input(gross)).unwrap()
            );
        }
        assert_eq!(uncached.cache_stats().len, 0);
    }

    #[test]
    fn clear_cache_empties_it() {
        let engine = TaxEngine::new();
        engine.compute_summary(&input(dec!(5000))).unwrap();

        engine.clear_cache();

        assert_eq!(engine.cache_stats().len, 0);
        assert!(engine.cache_keys().is_empty());
    }

    #[test]
    fn cache_respects_capacity() {
        let engine = TaxEngine::with_cache_capacity(3);
        for gross in [dec!(1000), dec!(2000), dec!(3000), dec!(4000), dec!(5000)] {
            engine.compute_summary(&input(gross)).unwrap();
        }

        assert_eq!(
            engine.cache_keys(),
            vec!["3000:2:5:true", "4000:2:5:true", "5000:2:5:true"]
        );
    }

    // =========================================================================
    // schedules
    // =========================================================================

    #[test]
    fn with_schedule_rejects_invalid_schedule() {
        let schedule = RateSchedule {
            brackets: Cow::Owned(Vec::new()),
            ..RateSchedule::CURRENT
        };

        let result = TaxEngine::new().with_schedule(schedule);

        assert_eq!(result.unwrap_err(), RateScheduleError::NoBrackets);
    }

    #[test]
    fn with_schedule_uses_new_rates() {
        let schedule = RateSchedule {
            contribution_rate: dec!(0.11),
            brackets: Cow::Owned(vec![TaxBracket::new(None, dec!(0), dec!(0))]),
            ..RateSchedule::CURRENT
        };
        let engine = TaxEngine::new().with_schedule(schedule).unwrap();

        let summary = engine
            .compute_summary(&TaxInput::new(dec!(5000.00), 0, dec!(0), false).unwrap())
            .unwrap();

        assert_eq!(summary.contribution.amount, dec!(550.00));
        assert_eq!(summary.income_tax.amount, dec!(0));
        assert_eq!(summary.net_amount, dec!(4450.00));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = TaxEngine::new();

        std::thread::scope(|scope| {
            for gross in [dec!(1500), dec!(2500), dec!(3500), dec!(1500)] {
                let engine = &engine;
                scope.spawn(move || engine.compute_summary(&input(gross)).unwrap());
            }
        });

        let stats = engine.cache_stats();
        assert_eq!(stats.len, 3);
        assert_eq!(stats.hits + stats.misses, 4);
    }

    #[test]
    fn concurrent_misses_on_one_key_cache_it_once() {
        let engine = TaxEngine::new();

        let summaries: Vec<TaxSummary> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let engine = &engine;
                    scope.spawn(move || engine.compute_summary(&input(dec!(5000.00))).unwrap())
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert!(summaries.iter().all(|summary| summary == &summaries[0]));
        let stats = engine.cache_stats();
        assert_eq!(stats.len, 1);
        assert_eq!(stats.hits + stats.misses, 8);
        assert_eq!(engine.cache_keys().len(), 1);
    }
}
