mod rate_schedule;
mod results;
mod tax_input;

pub use rate_schedule::{RateSchedule, TaxBracket};
pub use results::{
    ContributionResult, IncomeTaxResult, InversionResult, ServiceTaxResult, TaxSummary,
};
pub use tax_input::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SERVICE_TAX_RATE, DEFAULT_TOLERANCE, InversionRequest,
    TaxInput,
};
