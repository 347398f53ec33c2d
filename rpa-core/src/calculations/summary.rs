//! Combined withholding for one payment.
//!
//! | Step | Value                                                   |
//! |------|---------------------------------------------------------|
//! | 1    | Gross amount, rounded to cents                          |
//! | 2    | Contribution                                            |
//! | 3    | Income tax (deducts step 2)                             |
//! | 4    | Service tax, or zero when the payment is not subject    |
//! | 5    | Total tax: sum of the rounded amounts of steps 2 to 4   |
//! | 6    | Net amount: step 1 − step 5                             |
//! | 7    | Total tax as a percentage of step 1                     |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rpa_core::{RateSchedule, TaxInput};
//! use rpa_core::calculations::SummaryCalculator;
//!
//! let schedule = RateSchedule::CURRENT;
//! let input = TaxInput::new(dec!(5000.00), 2, dec!(5), true).unwrap();
//!
//! let summary = SummaryCalculator::new(&schedule).calculate(&input).unwrap();
//!
//! assert_eq!(summary.total_tax, dec!(1422.72));
//! assert_eq!(summary.net_amount, dec!(3577.28));
//! assert_eq!(summary.total_tax_percent, dec!(28.45));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{percent_of, round_half_up};
use crate::calculations::{
    ContributionCalculator, IncomeTaxCalculator, ServiceTaxCalculator, ensure_positive_gross,
};
use crate::error::TaxError;
use crate::models::{RateSchedule, ServiceTaxResult, TaxInput, TaxSummary};

/// Runs the three forward calculators and totals their results.
#[derive(Debug, Clone, Copy)]
pub struct SummaryCalculator<'a> {
    contribution: ContributionCalculator<'a>,
    income_tax: IncomeTaxCalculator<'a>,
    service_tax: ServiceTaxCalculator,
}

impl<'a> SummaryCalculator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self {
            contribution: ContributionCalculator::new(schedule),
            income_tax: IncomeTaxCalculator::new(schedule),
            service_tax: ServiceTaxCalculator::new(),
        }
    }

    /// Computes every withholding for a validated input.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] if the gross amount rounds to zero.
    pub fn calculate(
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

    /// Same as [`calculate`](Self::calculate) on raw parts.
    ///
    /// Only the calculators' own preconditions are enforced here, so the
    /// gross amount may exceed the entry-point sanity bound. The solver relies
    /// on this while it overshoots.
    pub(crate) fn summarize(
        &self,
        gross_amount: Decimal,
        dependents: u8,
        service_tax_rate: Decimal,
        include_service_tax: bool,
    ) -> Result<TaxSummary, TaxError> {
        let gross_amount = round_half_up(gross_amount);
        ensure_positive_gross(gross_amount)?;

        let contribution = self.contribution.calculate(gross_amount)?;
        let income_tax = self
            .income_tax
            .calculate(gross_amount, i32::from(dependents))?;
        let service_tax = if include_service_tax {
            self.service_tax.calculate(gross_amount, service_tax_rate)?
        } else {
            ServiceTaxResult::excluded()
        };

        let total_tax = contribution.amount + income_tax.amount + service_tax.amount;

        Ok(TaxSummary {
            gross_amount,
            total_tax,
            net_amount: gross_amount - total_tax,
            total_tax_percent: percent_of(total_tax, gross_amount),
            contribution,
            income_tax,
            service_tax,
        })
    }
}
