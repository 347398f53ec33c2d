use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// The input a failed precondition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    GrossAmount,
    NetAmount,
    Dependents,
    ServiceTaxRate,
    Tolerance,
    MaxIterations,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrossAmount => "gross amount",
            Self::NetAmount => "net amount",
            Self::Dependents => "dependents",
            Self::ServiceTaxRate => "service tax rate",
            Self::Tolerance => "tolerance",
            Self::MaxIterations => "max iterations",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the withholding engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// A calculator or entry-point precondition was violated.
    ///
    /// Raised synchronously and never retried by the engine itself; the
    /// calling layer is expected to surface `message` to the user.
    #[error("invalid {field}: {message}")]
    InvalidInput { field: InputField, message: String },

    /// The rate schedule has no bracket covering the taxable base.
    #[error("no income tax bracket found for taxable base {0}")]
    NoMatchingBracket(Decimal),
}

impl TaxError {
    pub(crate) fn invalid(
        field: InputField,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// The field that failed validation, if this is an input error.
    pub fn field(&self) -> Option<InputField> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            Self::NoMatchingBracket(_) => None,
        }
    }
}

/// Structural problems with a [`RateSchedule`](crate::RateSchedule).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateScheduleError {
    #[error("minimum wage must be positive, got {0}")]
    InvalidMinimumWage(Decimal),

    #[error("contribution ceiling must be positive, got {0}")]
    InvalidContributionCeiling(Decimal),

    #[error("contribution rate must be between 0 and 1, got {0}")]
    InvalidContributionRate(Decimal),

    #[error("per-dependent deduction must be non-negative, got {0}")]
    InvalidDependentDeduction(Decimal),

    #[error("no income tax brackets provided")]
    NoBrackets,

    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidBracketRate { index: usize, rate: Decimal },

    #[error("bracket {index} subtracted amount must be non-negative, got {amount}")]
    InvalidSubtractedAmount { index: usize, amount: Decimal },

    #[error("bracket {index} upper bound is not above the previous one")]
    UnsortedBrackets { index: usize },

    #[error("only the last bracket may be unbounded (bracket {index} is)")]
    UnboundedBeforeLast { index: usize },

    #[error("the last bracket must be unbounded")]
    BoundedLastBracket,
}
