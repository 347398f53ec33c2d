//! Shared money arithmetic for the withholding calculators.
//!
//! Every monetary value the engine reports goes through [`round_half_up`] at
//! the point it is produced, so sums of rounded components stay exact.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a value to cents, with midpoints going away from zero.
///
/// The result always carries exactly two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rpa_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(172.723)), dec!(172.72));
/// assert_eq!(round_half_up(dec!(1557.204)), dec!(1557.20));
/// assert_eq!(round_half_up(dec!(0.125)), dec!(0.13));
/// assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Returns the larger of two values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rpa_core::calculations::common::max;
///
/// assert_eq!(max(dec!(282.40), dec!(200.00)), dec!(282.40));
/// assert_eq!(max(dec!(-5.00), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Expresses `part` as a percentage of `whole`, rounded to cents.
///
/// A zero `whole` yields zero rather than dividing.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rpa_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(1422.72), dec!(5000.00)), dec!(28.45));
/// assert_eq!(percent_of(dec!(10.00), dec!(0)), dec!(0));
/// ```
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_half_up(part / whole * Decimal::ONE_HUNDRED)
}

/// Converts a fractional rate (`0.275`) to percent (`27.5`).
pub(crate) fn rate_to_percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}
