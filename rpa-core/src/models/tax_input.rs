use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{InputField, TaxError};
use crate::validation::{
    validate_dependents, validate_gross_amount, validate_net_amount, validate_service_tax_rate,
};

/// Service tax rate used when the caller does not supply one.
pub const DEFAULT_SERVICE_TAX_RATE: Decimal = dec!(5);

/// Default net-amount tolerance for [`InversionRequest`].
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// Default iteration budget for [`InversionRequest`].
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Forward inputs for one contractor payment.
///
/// Built through [`TaxInput::new`], which runs every validator first; the
/// fields cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxInput {
    gross_amount: Decimal,
    dependents: u8,
    service_tax_rate: Decimal,
    include_service_tax: bool,
}

impl TaxInput {
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] for the first field whose
    /// validator fails.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use rpa_core::{InputField, TaxInput};
    ///
    /// let input = TaxInput::new(dec!(5000.00), 2, dec!(5), true).unwrap();
    /// assert_eq!(input.dependents(), 2);
    ///
    /// let err = TaxInput::new(dec!(0), 0, dec!(5), true).unwrap_err();
    /// assert_eq!(err.field(), Some(InputField::GrossAmount));
    /// ```
    pub fn new(
        gross_amount: Decimal,
        dependents: i32,
        service_tax_rate: Decimal,
        include_service_tax: bool,
    ) -> Result<Self, TaxError> {
        validate_gross_amount(gross_amount).into_result(InputField::GrossAmount)?;
        let dependents = checked_dependents(dependents)?;
        validate_service_tax_rate(service_tax_rate).into_result(InputField::ServiceTaxRate)?;

        Ok(Self {
            gross_amount,
            dependents,
            service_tax_rate,
            include_service_tax,
        })
    }

    pub fn gross_amount(&self) -> Decimal {
        self.gross_amount
    }

    pub fn dependents(&self) -> u8 {
        self.dependents
    }

    pub fn service_tax_rate(&self) -> Decimal {
        self.service_tax_rate
    }

    pub fn include_service_tax(&self) -> bool {
        self.include_service_tax
    }
}

/// Inputs for finding the gross amount that yields a desired net amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InversionRequest {
    target_net_amount: Decimal,
    dependents: u8,
    service_tax_rate: Decimal,
    include_service_tax: bool,
    tolerance: Decimal,
    max_iterations: u32,
}

impl InversionRequest {
    /// Builds a request with the default tolerance and iteration budget.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] when the target net amount,
    /// dependents or service tax rate fail validation.
    pub fn new(
        target_net_amount: Decimal,
        dependents: i32,
        service_tax_rate: Decimal,
        include_service_tax: bool,
    ) -> Result<Self, TaxError> {
        validate_net_amount(target_net_amount).into_result(InputField::NetAmount)?;
        let dependents = checked_dependents(dependents)?;
        validate_service_tax_rate(service_tax_rate).into_result(InputField::ServiceTaxRate)?;

        Ok(Self {
            target_net_amount,
            dependents,
            service_tax_rate,
            include_service_tax,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// Replaces the accepted distance between actual and target net.
    ///
    /// # Errors
    ///
    /// The tolerance must be positive.
    pub fn with_tolerance(
        mut self,
        tolerance: Decimal,
    ) -> Result<Self, TaxError> {
        if tolerance <= Decimal::ZERO {
            return Err(TaxError::invalid(
                InputField::Tolerance,
                "tolerance must be greater than zero",
            ));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Replaces the iteration budget.
    ///
    /// # Errors
    ///
    /// At least one iteration is required.
    pub fn with_max_iterations(
        mut self,
        max_iterations: u32,
    ) -> Result<Self, TaxError> {
        if max_iterations == 0 {
            return Err(TaxError::invalid(
                InputField::MaxIterations,
                "at least one iteration is required",
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    pub fn target_net_amount(&self) -> Decimal {
        self.target_net_amount
    }

    pub fn dependents(&self) -> u8 {
        self.dependents
    }

    pub fn service_tax_rate(&self) -> Decimal {
        self.service_tax_rate
    }

    pub fn include_service_tax(&self) -> bool {
        self.include_service_tax
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

fn checked_dependents(dependents: i32) -> Result<u8, TaxError> {
    validate_dependents(dependents).into_result(InputField::Dependents)?;
    u8::try_from(dependents).map_err(|_| {
        TaxError::invalid(InputField::Dependents, "number of dependents is out of range")
    })
}
