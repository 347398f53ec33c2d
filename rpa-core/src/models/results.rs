use rust_decimal::Decimal;
use serde::Serialize;

/// Social security contribution for one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionResult {
    pub amount: Decimal,
    /// Nominal contribution rate, in percent.
    pub rate_percent: Decimal,
    /// Gross amount capped at the ceiling.
    pub taxable_base: Decimal,
    pub ceiling: Decimal,
    pub minimum_wage: Decimal,
    /// The minimum-wage floor raised the contribution.
    pub floor_applied: bool,
    /// The gross amount exceeded the ceiling.
    pub ceiling_applied: bool,
}

/// Progressive income tax for one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeTaxResult {
    pub amount: Decimal,
    /// Marginal rate of the bracket used, in percent. Zero when nothing is taxable.
    pub rate_percent: Decimal,
    /// Gross minus both deductions, never negative.
    pub taxable_base: Decimal,
    pub contribution_deduction: Decimal,
    pub dependents_deduction: Decimal,
    /// The bracket's fixed amount subtracted from `base × rate`.
    pub subtracted_amount: Decimal,
}

/// Municipal service tax for one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceTaxResult {
    pub amount: Decimal,
    pub rate_percent: Decimal,
    pub taxable_base: Decimal,
}

impl ServiceTaxResult {
    /// Placeholder used when the payment is not subject to service tax.
    pub fn excluded() -> Self {
        Self {
            amount: Decimal::ZERO,
            rate_percent: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
        }
    }
}

/// All withholdings for one payment plus the resulting net amount.
///
/// `total_tax` is the exact sum of the three rounded component amounts and
/// `net_amount` is `gross_amount - total_tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSummary {
    pub gross_amount: Decimal,
    pub contribution: ContributionResult,
    pub income_tax: IncomeTaxResult,
    pub service_tax: ServiceTaxResult,
    pub total_tax: Decimal,
    pub net_amount: Decimal,
    pub total_tax_percent: Decimal,
}

/// Outcome of searching for the gross amount behind a target net amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InversionResult {
    pub converged: bool,
    pub gross_amount_found: Decimal,
    pub target_net_amount: Decimal,
    pub actual_net_amount: Decimal,
    /// `actual_net_amount - target_net_amount`.
    pub net_difference: Decimal,
    pub iterations_used: u32,
    /// Full breakdown for `gross_amount_found`.
    pub summary: TaxSummary,
    /// Set when the search stopped without meeting the tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
