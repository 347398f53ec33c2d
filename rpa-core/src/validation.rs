//! Range checks shared by the forward and inverse entry points.
//!
//! Each check returns a [`Validation`] rather than an error so the calling
//! layer can show the message next to the offending field. The constructors
//! of [`TaxInput`](crate::TaxInput) and
//! [`InversionRequest`](crate::InversionRequest) turn a failed check into
//! [`TaxError::InvalidInput`] before any calculator runs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{InputField, TaxError};

/// Upper sanity bound for gross and net amounts.
pub const MAX_AMOUNT: Decimal = dec!(1000000.00);

/// Smallest positive amount; anything below rounds to zero cents.
pub const MIN_AMOUNT: Decimal = dec!(0.01);

/// Largest number of dependents accepted.
pub const MAX_DEPENDENTS: i32 = 20;

/// Outcome of a single range check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    /// Human-readable reason; empty when `valid`.
    pub message: String,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    /// Converts a failed check into [`TaxError::InvalidInput`] for `field`.
    pub fn into_result(
        self,
        field: InputField,
    ) -> Result<(), TaxError> {
        if self.valid {
            Ok(())
        } else {
            Err(TaxError::invalid(field, self.message))
        }
    }
}

fn validate_amount(
    value: Decimal,
    label: &str,
) -> Validation {
    if value <= Decimal::ZERO {
        return Validation::fail(format!("{label} must be greater than zero"));
    }
    if value < MIN_AMOUNT {
        return Validation::fail(format!("{label} must be at least {MIN_AMOUNT}"));
    }
    if value > MAX_AMOUNT {
        return Validation::fail(format!(
            "{label} is too high (maximum: {MAX_AMOUNT:.2})"
        ));
    }
    Validation::ok()
}

/// Gross amount must be in [`MIN_AMOUNT`]`..=`[`MAX_AMOUNT`].
pub fn validate_gross_amount(value: Decimal) -> Validation {
    validate_amount(value, "gross amount")
}

/// Net amount must be in [`MIN_AMOUNT`]`..=`[`MAX_AMOUNT`].
pub fn validate_net_amount(value: Decimal) -> Validation {
    validate_amount(value, "net amount")
}

/// Dependents must be in `0..=20`.
pub fn validate_dependents(value: i32) -> Validation {
    if value < 0 {
        return Validation::fail("number of dependents cannot be negative");
    }
    if value > MAX_DEPENDENTS {
        return Validation::fail(format!(
            "number of dependents is too high (maximum: {MAX_DEPENDENTS})"
        ));
    }
    Validation::ok()
}

/// Service tax rate is a percentage in `0..=100`.
pub fn validate_service_tax_rate(value: Decimal) -> Validation {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Validation::fail("service tax rate must be between 0% and 100%");
    }
    Validation::ok()
}
