//! Progressive income tax withheld at source (IRRF).
//!
//! The taxable base is the gross amount minus the contribution withheld on
//! the same payment and a fixed deduction per dependent. The contribution is
//! re-derived here through [`ContributionCalculator`] so both calculators
//! always agree on it.
//!
//! | Step | Value                                                         |
//! |------|---------------------------------------------------------------|
//! | 1    | Contribution deduction (contribution calculator)              |
//! | 2    | Dependents deduction: dependents × per-dependent amount       |
//! | 3    | Taxable base: gross − step 1 − step 2                         |
//! | 4    | Bracket: first whose upper bound is ≥ base                    |
//! | 5    | Tax: base × bracket rate − bracket subtracted amount, min 0   |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rpa_core::RateSchedule;
//! use rpa_core::calculations::IncomeTaxCalculator;
//!
//! let schedule = RateSchedule::CURRENT;
//! let calculator = IncomeTaxCalculator::new(&schedule);
//!
//! let result = calculator.calculate(dec!(5000.00), 2).unwrap();
//!
//! // 5000.00 − 1000.00 − 2 × 189.59
//! assert_eq!(result.taxable_base, dec!(3620.82));
//! // 3620.82 × 15% − 370.40
//! assert_eq!(result.amount, dec!(172.72));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, rate_to_percent, round_half_up};
use crate::calculations::{ContributionCalculator, ensure_positive_gross};
use crate::error::{InputField, TaxError};
use crate::models::{IncomeTaxResult, RateSchedule};
use crate::validation::validate_dependents;

/// Calculator for the progressive income tax.
#[derive(Debug, Clone, Copy)]
pub struct IncomeTaxCalculator<'a> {
    schedule: &'a RateSchedule,
    contribution: ContributionCalculator<'a>,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self {
            schedule,
            contribution: ContributionCalculator::new(schedule),
        }
    }

    /// Computes the income tax withheld from `gross_amount`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive
    /// or `dependents` is outside `0..=20`, and
    /// [`TaxError::NoMatchingBracket`] if the schedule has no bracket for the
    /// base (impossible for a validated schedule).
    pub fn calculate(
        &self,
        gross_amount: Decimal,
        dependents: i32,
    ) -> Result<IncomeTaxResult, TaxError> {
        ensure_positive_gross(gross_amount)?;
        validate_dependents(dependents).into_result(InputField::Dependents)?;

        let contribution_deduction = self.contribution.calculate(gross_amount)?.amount;
        let dependents_deduction = self.dependents_deduction(dependents);
        let taxable_base = gross_amount - contribution_deduction - dependents_deduction;

        if taxable_base <= Decimal::ZERO {
            debug!(
                gross_amount = %gross_amount,
                taxable_base = %taxable_base,
                "deductions exceed gross amount; no income tax due"
            );
            return Ok(IncomeTaxResult {
                amount: Decimal::ZERO,
                rate_percent: Decimal::ZERO,
                taxable_base: Decimal::ZERO,
                contribution_deduction,
                dependents_deduction,
                subtracted_amount: Decimal::ZERO,
            });
        }

        let bracket = self
            .schedule
            .bracket_for(taxable_base)
            .ok_or(TaxError::NoMatchingBracket(taxable_base))?;

        let tax = taxable_base * bracket.rate - bracket.subtracted_amount;

        Ok(IncomeTaxResult {
            amount: round_half_up(max(tax, Decimal::ZERO)),
            rate_percent: rate_to_percent(bracket.rate),
            taxable_base: round_half_up(taxable_base),
            contribution_deduction,
            dependents_deduction,
            subtracted_amount: round_half_up(bracket.subtracted_amount),
        })
    }

    fn dependents_deduction(
        &self,
        dependents: i32,
    ) -> Decimal {
        round_half_up(Decimal::from(dependents) * self.schedule.dependent_deduction)
    }
}
