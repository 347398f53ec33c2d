//! Municipal service tax (ISS) on the full gross amount.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::calculations::ensure_positive_gross;
use crate::error::{InputField, TaxError};
use crate::models::ServiceTaxResult;
use crate::validation::validate_service_tax_rate;

/// Flat percentage of the gross amount. Stateless; the rate is supplied per
/// payment since it depends on the municipality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceTaxCalculator;

impl ServiceTaxCalculator {
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when `gross_amount` is not positive
    /// or too large to tax, or `rate_percent` is outside `0..=100`.
    pub fn calculate(
        &self,
        gross_amount: Decimal,
        rate_percent: Decimal,
    ) -> Result<ServiceTaxResult, TaxError> {
        ensure_positive_gross(gross_amount)?;
        validate_service_tax_rate(rate_percent).into_result(InputField::ServiceTaxRate)?;

        let amount = gross_amount
            .checked_mul(rate_percent)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                TaxError::invalid(InputField::GrossAmount, "gross amount is too high")
            })?;

        Ok(ServiceTaxResult {
            amount: round_half_up(amount),
            rate_percent,
            taxable_base: round_half_up(gross_amount),
        })
    }
}
