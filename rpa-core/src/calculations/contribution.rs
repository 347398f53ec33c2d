//! Social security contribution (INSS) for independent contractors.
//!
//! | Step | Value                                          |
//! |------|------------------------------------------------|
//! | 1    | Base: smaller of gross amount and the ceiling  |
//! | 2    | Raw contribution: base × flat rate             |
//! | 3    | Floor: minimum wage × flat rate                |
//! | 4    | Contribution: larger of steps 2 and 3, rounded |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rpa_core::RateSchedule;
//! use rpa_core::calculations::ContributionCalculator;
//!
//! let schedule = RateSchedule::CURRENT;
//! let calculator = ContributionCalculator::new(&schedule);
//!
//! let result = calculator.calculate(dec!(5000.00)).unwrap();
//! assert_eq!(result.amount, dec!(1000.00));
//!
//! // Above the ceiling the contribution stops growing.
//! let capped = calculator.calculate(dec!(10000.00)).unwrap();
//! assert_eq!(capped.amount, dec!(1557.20));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, rate_to_percent, round_half_up};
use crate::calculations::ensure_positive_gross;
use crate::error::TaxError;
use crate::models::{ContributionResult, RateSchedule};

/// Calculator for the flat-rate contribution with floor and ceiling.
#[derive(Debug, Clone, Copy)]
pub struct ContributionCalculator<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> ContributionCalculator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Computes the contribution withheld from `gross_amount`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive.
    pub fn calculate(
        &self,
        gross_amount: Decimal,
    ) -> Result<ContributionResult, TaxError> {
        ensure_positive_gross(gross_amount)?;

        let ceiling_applied = gross_amount > self.schedule.contribution_ceiling;
        if ceiling_applied {
            debug!(
                gross_amount = %gross_amount,
                ceiling = %self.schedule.contribution_ceiling,
                "contribution base capped at ceiling"
            );
        }
        let base = self.taxable_base(gross_amount);
        let raw = base * self.schedule.contribution_rate;
        let floor = self.schedule.contribution_floor();

        let floor_applied = raw < floor;
        if floor_applied {
            debug!(
                gross_amount = %gross_amount,
                raw = %raw,
                floor = %floor,
                "contribution raised to minimum-wage floor"
            );
        }

        Ok(ContributionResult {
            amount: round_half_up(max(raw, floor)),
            rate_percent: rate_to_percent(self.schedule.contribution_rate),
            taxable_base: round_half_up(base),
            ceiling: self.schedule.contribution_ceiling,
            minimum_wage: self.schedule.minimum_wage,
            floor_applied,
            ceiling_applied,
        })
    }

    /// Gross amount capped at the contribution ceiling.
    fn taxable_base(
        &self,
        gross_amount: Decimal,
    ) -> Decimal {
        gross_amount.min(self.schedule.contribution_ceiling)
    }
}
