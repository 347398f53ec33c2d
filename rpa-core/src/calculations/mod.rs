//! Withholding calculations for independent-contractor payments.
//!
//! The three forward calculators each price one tax from a gross amount.
//! [`SummaryCalculator`] combines them, and [`GrossUpSolver`] runs the
//! combination backwards from a desired net amount.

pub mod common;
pub mod contribution;
pub mod income_tax;
pub mod service_tax;
pub mod solver;
pub mod summary;

pub use contribution::ContributionCalculator;
pub use income_tax::IncomeTaxCalculator;
pub use service_tax::ServiceTaxCalculator;
pub use solver::GrossUpSolver;
pub use summary::SummaryCalculator;

use rust_decimal::Decimal;

use crate::error::{InputField, TaxError};

/// Precondition shared by every forward calculator.
pub(crate) fn ensure_positive_gross(gross_amount: Decimal) -> Result<(), TaxError> {
    if gross_amount <= Decimal::ZERO {
        return Err(TaxError::invalid(
            InputField::GrossAmount,
            "gross amount must be greater than zero",
        ));
    }
    Ok(())
}
