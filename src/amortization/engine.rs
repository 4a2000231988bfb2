use crate::core::ledger::{LedgerEntry, LoanSchedule};
use crate::core::loan::{LoanError, LoanInput};
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default ceiling on schedule length: one hundred years of payments.
pub const DEFAULT_MAX_MONTHS: u32 = 1200;

/// Bounds applied to every schedule computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLimits {
    /// Longest schedule the engine will produce before giving up.
    pub max_months: u32,
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
        }
    }
}

/// The core amortization engine.
///
/// Turns a validated [`LoanInput`] into the month-by-month ledger of a
/// fixed-payment loan.
///
/// # Algorithm
///
/// Starting from month 1, with `balance = principal`:
///
/// 1. `interest = balance * annual_rate / 100 / 12`
/// 2. `total_due = balance + interest`
/// 3. `payment = min(monthly_payment, total_due)`
/// 4. `principal_portion = payment - interest`
/// 5. `balance -= principal_portion`, `cumulative_paid += payment`
///
/// repeated while the balance is positive. Loans whose payment cannot cover
/// the first month's interest are rejected up front, and the loop is capped
/// at [`ScheduleLimits::max_months`].
///
/// # Examples
///
/// ```
/// use loan_engine::amortization::engine::AmortizationEngine;
/// use loan_engine::core::loan::LoanInput;
/// use rust_decimal_macros::dec;
///
/// let loan = LoanInput::new(dec!(100_000), dec!(0), dec!(50_000)).unwrap();
/// let schedule = AmortizationEngine::default().compute_schedule(&loan).unwrap();
/// assert_eq!(schedule.months(), 2);
/// assert_eq!(schedule.total_paid(), dec!(100_000));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationEngine {
    limits: ScheduleLimits,
}

impl AmortizationEngine {
    pub fn new(limits: ScheduleLimits) -> Self {
        Self { limits }
    }

    /// Compute the full schedule for one loan.
    ///
    /// Amounts whose interest, balance due or running total would exceed
    /// `Decimal::MAX` fail with [`LoanError::Overflow`].
    pub fn compute_schedule(&self, input: &LoanInput) -> Result<LoanSchedule, LoanError> {
        let first_interest = input.first_month_interest()?;
        if input.monthly_payment() == Decimal::ZERO {
            return Err(LoanError::UnpayableLoan {
                payment: input.monthly_payment(),
                interest: first_interest,
            });
        }
        if input.principal() == Decimal::ZERO {
            debug!("{}: nothing to repay, empty schedule", input);
            return Ok(LoanSchedule::new(*input, Vec::new()));
        }
        if input.monthly_payment() <= first_interest {
            return Err(LoanError::UnpayableLoan {
                payment: input.monthly_payment(),
                interest: first_interest,
            });
        }

        let mut entries = Vec::new();
        let mut balance = input.principal();
        let mut cumulative_paid = Decimal::ZERO;
        let mut month = 0u32;

        while balance > Decimal::ZERO {
            if month == self.limits.max_months {
                return Err(LoanError::MonthCapExceeded {
                    cap: self.limits.max_months,
                    remaining: balance,
                });
            }
            month += 1;

            let interest = input.interest_on(balance)?;
            let total_due = balance
                .checked_add(interest)
                .ok_or_else(|| LoanError::overflow("balance due"))?;
            // The last payment is capped at what is owed, closing the balance
            // to exactly zero.
            let (payment, principal_portion) = if input.monthly_payment() >= total_due {
                (total_due, balance)
            } else {
                (input.monthly_payment(), input.monthly_payment() - interest)
            };
            let principal_after = balance - principal_portion;
            cumulative_paid = cumulative_paid
                .checked_add(payment)
                .ok_or_else(|| LoanError::overflow("total paid"))?;

            trace!(
                "month {}: balance {} -> {}, interest {}, payment {}",
                month,
                balance,
                principal_after,
                interest,
                payment
            );

            entries.push(LedgerEntry {
                month,
                year_fraction: LedgerEntry::year_fraction_of(month),
                principal_before: balance,
                principal_after,
                interest_rate_percent: input.annual_rate_percent(),
                payment,
                interest,
                principal_portion,
                cumulative_paid,
            });

            balance = principal_after;
        }

        debug!(
            "{}: repaid in {} months, total paid {}",
            input, month, cumulative_paid
        );
        Ok(LoanSchedule::new(*input, entries))
    }
}
