use std::borrow::Cow;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::RateScheduleError;

/// One band of the progressive income tax table.
///
/// A taxable base belongs to the first bracket (in ascending order) whose
/// `upper_bound` is greater than or equal to it. `None` marks the open-ended
/// top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBracket {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub subtracted_amount: Decimal,
}

impl TaxBracket {
    pub const fn new(
        upper_bound: Option<Decimal>,
        rate: Decimal,
        subtracted_amount: Decimal,
    ) -> Self {
        Self {
            upper_bound,
            rate,
            subtracted_amount,
        }
    }

    /// Whether `base` lies at or below this bracket's upper bound.
    pub fn covers(
        &self,
        base: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|upper| base <= upper)
    }
}

const INCOME_TAX_BRACKETS: [TaxBracket; 5] = [
    TaxBracket::new(Some(dec!(2112.00)), dec!(0), dec!(0)),
    TaxBracket::new(Some(dec!(2826.65)), dec!(0.075), dec!(158.40)),
    TaxBracket::new(Some(dec!(3751.05)), dec!(0.15), dec!(370.40)),
    TaxBracket::new(Some(dec!(4664.68)), dec!(0.225), dec!(651.73)),
    TaxBracket::new(None, dec!(0.275), dec!(884.96)),
];

/// The rates and limits every calculator reads from.
///
/// The engine runs against a single process-wide schedule,
/// [`RateSchedule::CURRENT`]. Alternative schedules are only accepted after
/// [`RateSchedule::validate`] passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateSchedule {
    /// Minimum wage; the contribution never falls below this times the rate.
    pub minimum_wage: Decimal,
    /// Largest gross amount subject to the contribution.
    pub contribution_ceiling: Decimal,
    /// Flat contribution rate for independent contractors.
    pub contribution_rate: Decimal,
    /// Income tax base reduction per declared dependent.
    pub dependent_deduction: Decimal,
    /// Progressive brackets, ascending by upper bound.
    pub brackets: Cow<'static, [TaxBracket]>,
}

impl RateSchedule {
    pub const CURRENT: RateSchedule = RateSchedule {
        minimum_wage: dec!(1412.00),
        contribution_ceiling: dec!(7786.02),
        contribution_rate: dec!(0.20),
        dependent_deduction: dec!(189.59),
        brackets: Cow::Borrowed(&INCOME_TAX_BRACKETS),
    };

    /// Smallest contribution any payment can carry.
    pub fn contribution_floor(&self) -> Decimal {
        self.minimum_wage * self.contribution_rate
    }

    /// Largest contribution any payment can carry.
    pub fn contribution_cap(&self) -> Decimal {
        self.contribution_ceiling * self.contribution_rate
    }

    /// Finds the bracket that applies to a positive taxable base.
    ///
    /// The table is ordered, so this is a binary search for the first bracket
    /// whose upper bound is not below `base`. A base sitting exactly on a
    /// bound stays in the lower bracket.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use rpa_core::RateSchedule;
    ///
    /// let schedule = RateSchedule::CURRENT;
    /// let bracket = schedule.bracket_for(dec!(2826.65)).unwrap();
    ///
    /// assert_eq!(bracket.rate, dec!(0.075));
    /// ```
    pub fn bracket_for(
        &self,
        base: Decimal,
    ) -> Option<&TaxBracket> {
        let index = self.brackets.partition_point(|bracket| !bracket.covers(base));
        self.brackets.get(index)
    }

    /// Checks the schedule is usable by the calculators.
    ///
    /// # Errors
    ///
    /// Returns [`RateScheduleError`] if a limit is non-positive, a rate is
    /// outside `[0, 1]`, or the brackets are not strictly ascending with a
    /// single unbounded bracket at the end.
    pub fn validate(&self) -> Result<(), RateScheduleError> {
        if self.minimum_wage <= Decimal::ZERO {
            return Err(RateScheduleError::InvalidMinimumWage(self.minimum_wage));
        }
        if self.contribution_ceiling <= Decimal::ZERO {
            return Err(RateScheduleError::InvalidContributionCeiling(
                self.contribution_ceiling,
            ));
        }
        if self.contribution_rate < Decimal::ZERO || self.contribution_rate > Decimal::ONE {
            return Err(RateScheduleError::InvalidContributionRate(
                self.contribution_rate,
            ));
        }
        if self.dependent_deduction < Decimal::ZERO {
            return Err(RateScheduleError::InvalidDependentDeduction(
                self.dependent_deduction,
            ));
        }
        if self.brackets.is_empty() {
            return Err(RateScheduleError::NoBrackets);
        }

        let last = self.brackets.len() - 1;
        let mut previous: Option<Decimal> = None;
        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RateScheduleError::InvalidBracketRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if bracket.subtracted_amount < Decimal::ZERO {
                return Err(RateScheduleError::InvalidSubtractedAmount {
                    index,
                    amount: bracket.subtracted_amount,
                });
            }
            match bracket.upper_bound {
                Some(upper) => {
                    if index == last {
                        return Err(RateScheduleError::BoundedLastBracket);
                    }
                    if previous.is_some_and(|prev| upper <= prev) {
                        return Err(RateScheduleError::UnsortedBrackets { index });
                    }
                    previous = Some(upper);
                }
                None if index != last => {
                    return Err(RateScheduleError::UnboundedBeforeLast { index });
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self::CURRENT
    }
}
