//! Gross-up: the gross amount that leaves a desired net amount.
//!
//! There is no closed form because the contribution floor and ceiling and
//! the bracket table make net a piecewise function of gross. The solver runs
//! a proportional correction instead:
//!
//! 1. Start at `target × 1.35`.
//! 2. Summarize the estimate; stop when `|net − target| ≤ tolerance`.
//! 3. Otherwise scale the estimate by `target / net`.
//! 4. When net is not positive, or once a scaled step overshoots the target
//!    or fails to get closer, switch to the damped step `gross + (target − net)`
//!    for the rest of the run. Net never grows faster than gross.
//! 5. A next estimate that is not positive or cannot be formed restarts from
//!    `target × 1.5`.
//! 6. If an estimate cannot be summarized, nudge it up by 5% and retry.
//!
//! The estimate with the smallest distance seen is returned if the iteration
//! budget runs out.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::engine::TaxEngine;
use crate::error::TaxError;
use crate::models::{InversionRequest, InversionResult, TaxSummary};

const INITIAL_FACTOR: Decimal = dec!(1.35);
const RESTART_FACTOR: Decimal = dec!(1.5);
const PERTURBATION: Decimal = dec!(1.05);

/// Best estimate seen so far and its distance from the target.
#[derive(Debug, Clone, Copy)]
struct Best {
    gross_amount: Decimal,
    distance: Decimal,
}

/// Inverse of the summary calculation, evaluated through the engine cache.
#[derive(Debug, Clone, Copy)]
pub struct GrossUpSolver<'a> {
    engine: &'a TaxEngine,
}

impl<'a> GrossUpSolver<'a> {
    pub fn new(engine: &'a TaxEngine) -> Self {
        Self { engine }
    }

    /// Runs the search described in the module docs.
    ///
    /// # Errors
    ///
    /// Fails only when the budget is exhausted and the best estimate cannot
    /// be summarized.
    pub fn solve(
        &self,
        request: &InversionRequest,
    ) -> Result<InversionResult, TaxError> {
        let target = request.target_net_amount();
        let mut gross_amount = target * INITIAL_FACTOR;
        let mut best = Best {
            gross_amount,
            distance: Decimal::MAX,
        };
        let mut previous: Option<Decimal> = None;
        let mut damped = false;

        for iteration in 0..request.max_iterations() {
            let summary = match self.evaluate(request, gross_amount) {
                Ok(summary) => summary,
                Err(err) => {
                    debug!(
                        iteration,
                        gross_amount = %gross_amount,
                        error = %err,
                        "estimate rejected; perturbing"
                    );
                    gross_amount = gross_amount
                        .checked_mul(PERTURBATION)
                        .unwrap_or(target * RESTART_FACTOR);
                    continue;
                }
            };

            let difference = summary.net_amount - target;
            let distance = difference.abs();
            debug!(
                iteration,
                gross_amount = %summary.gross_amount,
                net_amount = %summary.net_amount,
                difference = %difference,
                "gross-up step"
            );

            if distance < best.distance {
                best = Best {
                    gross_amount: summary.gross_amount,
                    distance,
                };
            }

            if distance <= request.tolerance() {
                return Ok(Self::result(request, summary, true, iteration + 1, None));
            }

            if !damped
                && summary.net_amount > Decimal::ZERO
                && previous.is_some_and(|previous| stalled(previous, difference))
            {
                debug!(iteration, "scaled step overshot; damping");
                damped = true;
            }
            gross_amount = next_estimate(gross_amount, summary.net_amount, target, damped);
            previous = Some(difference);
        }

        let summary = self.evaluate(request, best.gross_amount)?;
        let difference = summary.net_amount - target;
        warn!(
            target_net_amount = %target,
            gross_amount = %summary.gross_amount,
            difference = %difference,
            iterations = request.max_iterations(),
            "gross-up did not converge; returning closest estimate"
        );
        let warning = format!("did not fully converge; difference: {difference:.2}");

        Ok(Self::result(
            request,
            summary,
            false,
            request.max_iterations(),
            Some(warning),
        ))
    }

    fn evaluate(
        &self,
        request: &InversionRequest,
        gross_amount: Decimal,
    ) -> Result<TaxSummary, TaxError> {
        self.engine.summarize(
            gross_amount,
            request.dependents(),
            request.service_tax_rate(),
            request.include_service_tax(),
        )
    }

    fn result(
        request: &InversionRequest,
        summary: TaxSummary,
        converged: bool,
        iterations_used: u32,
        warning: Option<String>,
    ) -> InversionResult {
        let target = request.target_net_amount();
        InversionResult {
            converged,
            gross_amount_found: summary.gross_amount,
            target_net_amount: target,
            actual_net_amount: summary.net_amount,
            net_difference: summary.net_amount - target,
            iterations_used,
            summary,
            warning,
        }
    }
}

/// Next gross to try: scaled by `target / net` while the scaled step is
/// trusted and net is positive, otherwise moved by `target − net`.
fn next_estimate(
    gross_amount: Decimal,
    net_amount: Decimal,
    target: Decimal,
    damped: bool,
) -> Decimal {
    let next = if damped || net_amount <= Decimal::ZERO {
        target
            .checked_sub(net_amount)
            .and_then(|step| gross_amount.checked_add(step))
    } else {
        gross_amount
            .checked_mul(target)
            .and_then(|scaled| scaled.checked_div(net_amount))
    };

    match next {
        Some(next) if next > Decimal::ZERO => next,
        _ => target * RESTART_FACTOR,
    }
}

/// True when the latest difference crossed the target or did not shrink.
fn stalled(
    previous: Decimal,
    difference: Decimal,
) -> bool {
    (previous < Decimal::ZERO) != (difference < Decimal::ZERO)
        || difference.abs() >= previous.abs()
}
