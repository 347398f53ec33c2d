//! Withholding engine for Brazilian independent-contractor payments (RPA).
//!
//! Computes the social security contribution, the progressive income tax
//! and the municipal service tax for a gross payment, and searches for the
//! gross payment that leaves a desired net amount.

pub mod cache;
pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod validation;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, SummaryCache, SummaryKey};
pub use engine::TaxEngine;
pub use error::{InputField, RateScheduleError, TaxError};
pub use models::*;
pub use validation::{
    MAX_AMOUNT, MAX_DEPENDENTS, MIN_AMOUNT, Validation, validate_dependents, validate_gross_amount,
    validate_net_amount, validate_service_tax_rate,
};
