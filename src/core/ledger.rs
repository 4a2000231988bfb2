use crate::core::loan::{LoanInput, MONTHS_PER_YEAR};
use crate::core::rounding::round_presentation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One month of a single loan's amortization.
///
/// Invariants, for every entry produced by the engine:
/// - `payment == interest + principal_portion`
/// - `principal_after == principal_before - principal_portion`
/// - `cumulative_paid` never decreases from one month to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 1-based month index.
    pub month: u32,
    /// `month / 12`.
    pub year_fraction: Decimal,
    /// Outstanding balance at the start of the month.
    pub principal_before: Decimal,
    /// Outstanding balance after this month's payment.
    pub principal_after: Decimal,
    /// Annual rate in percent, carried on every entry for display.
    pub interest_rate_percent: Decimal,
    /// Amount actually paid this month (capped on the final month).
    pub payment: Decimal,
    /// Interest accrued this month.
    pub interest: Decimal,
    /// Share of the payment that reduced the balance.
    pub principal_portion: Decimal,
    /// Running total of payments through this month.
    pub cumulative_paid: Decimal,
}

impl LedgerEntry {
    pub fn year_fraction_of(month: u32) -> Decimal {
        Decimal::from(month) / Decimal::from(MONTHS_PER_YEAR)
    }

    /// A copy with every numeric field rounded for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            month: self.month,
            year_fraction: round_presentation(self.year_fraction),
            principal_before: round_presentation(self.principal_before),
            principal_after: round_presentation(self.principal_after),
            interest_rate_percent: round_presentation(self.interest_rate_percent),
            payment: round_presentation(self.payment),
            interest: round_presentation(self.interest),
            principal_portion: round_presentation(self.principal_portion),
            cumulative_paid: round_presentation(self.cumulative_paid),
        }
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rounded();
        write!(
            f,
            "Month {:>4}: principal {:.2}  rate {:.2}%  payment {:.2}  interest {:.2}  principal reduction {:.2}  total paid {:.2}",
            r.month,
            r.principal_after,
            r.interest_rate_percent,
            r.payment,
            r.interest,
            r.principal_portion,
            r.cumulative_paid
        )
    }
}

/// The full amortization of one loan, in month order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanSchedule {
    input: LoanInput,
    entries: Vec<LedgerEntry>,
}

impl LoanSchedule {
    pub(crate) fn new(input: LoanInput, entries: Vec<LedgerEntry>) -> Self {
        Self { input, entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entry for a 1-based month, if the loan is still running then.
    pub fn entry(&self, month: u32) -> Option<&LedgerEntry> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.entries.get(index)
    }

    /// Number of months until the loan is repaid.
    pub fn months(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn final_entry(&self) -> Option<&LedgerEntry> {
        self.entries.last()
    }

    /// Total paid over the life of the loan.
    pub fn total_paid(&self) -> Decimal {
        self.final_entry()
            .map(|e| e.cumulative_paid)
            .unwrap_or(Decimal::ZERO)
    }

    /// Total interest paid over the life of the loan.
    pub fn total_interest(&self) -> Decimal {
        self.entries.iter().map(|e| e.interest).sum()
    }
}

impl fmt::Display for LoanSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Amortization Schedule ===")?;
        writeln!(f, "Loan: {}", self.input)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f, "\nMonths:          {}", self.months())?;
        writeln!(f, "Total Interest:  {:.2}", round_presentation(self.total_interest()))?;
        writeln!(f, "Total Paid:      {:.2}", round_presentation(self.total_paid()))
    }
}
