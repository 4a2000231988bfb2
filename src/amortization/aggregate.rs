use crate::amortization::engine::AmortizationEngine;
use crate::core::ledger::{LedgerEntry, LoanSchedule};
use crate::core::loan::{LoanError, LoanInput};
use crate::core::rounding::round_presentation;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sums across every loan contributing to one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthTotals {
    pub principal_before: Decimal,
    pub principal_after: Decimal,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal_portion: Decimal,
    /// Sum of each loan's latest cumulative paid, including loans that have
    /// already been repaid.
    pub cumulative_paid: Decimal,
}

fn checked_sum(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LoanError> {
    a.checked_add(b).ok_or_else(|| LoanError::overflow(what))
}

impl MonthTotals {
    fn add(&mut self, entry: &LedgerEntry) -> Result<(), LoanError> {
        self.principal_before = checked_sum(
            self.principal_before,
            entry.principal_before,
            "total original principal",
        )?;
        self.principal_after = checked_sum(
            self.principal_after,
            entry.principal_after,
            "total remaining principal",
        )?;
        self.payment = checked_sum(self.payment, entry.payment, "total monthly payment")?;
        self.interest = checked_sum(self.interest, entry.interest, "total interest")?;
        self.principal_portion = checked_sum(
            self.principal_portion,
            entry.principal_portion,
            "total principal reduction",
        )?;
        Ok(())
    }

    pub fn rounded(&self) -> Self {
        Self {
            principal_before: round_presentation(self.principal_before),
            principal_after: round_presentation(self.principal_after),
            payment: round_presentation(self.payment),
            interest: round_presentation(self.interest),
            principal_portion: round_presentation(self.principal_portion),
            cumulative_paid: round_presentation(self.cumulative_paid),
        }
    }
}

/// One month of a loan portfolio: the entries of every loan still running
/// that month, in input order, and their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMonth {
    pub month: u32,
    pub entries: Vec<LedgerEntry>,
    pub totals: MonthTotals,
}

impl AggregatedMonth {
    pub fn rounded(&self) -> Self {
        Self {
            month: self.month,
            entries: self.entries.iter().map(LedgerEntry::rounded).collect(),
            totals: self.totals.rounded(),
        }
    }

    /// Number of loans still being repaid this month.
    pub fn active_loans(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for AggregatedMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.totals.rounded();
        writeln!(
            f,
            "Month {:>4} ({} active): remaining {:.2}  payment {:.2}  interest {:.2}  principal reduction {:.2}  total paid {:.2}",
            self.month,
            self.active_loans(),
            t.principal_after,
            t.payment,
            t.interest,
            t.principal_portion,
            t.cumulative_paid
        )?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry)?;
        }
        Ok(())
    }
}

/// Runs the engine over several independent loans and merges their
/// schedules month by month.
///
/// Loans are aligned on month index. A loan stops contributing to the
/// per-month sums once it is repaid, but its final cumulative paid keeps
/// counting towards the portfolio's cumulative total.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLoanAggregator {
    engine: AmortizationEngine,
}

impl MultiLoanAggregator {
    pub fn new(engine: AmortizationEngine) -> Self {
        Self { engine }
    }

    /// Compute and merge the schedules of every loan.
    ///
    /// The first loan that fails aborts the whole aggregation; the error
    /// carries that loan's index. Totals too large to represent fail with
    /// [`LoanError::Overflow`].
    pub fn aggregate(&self, loans: &[LoanInput]) -> Result<Vec<AggregatedMonth>, LoanError> {
        let schedules = loans
            .iter()
            .enumerate()
            .map(|(index, loan)| {
                self.engine
                    .compute_schedule(loan)
                    .map_err(|e| e.in_loan(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::aggregate_schedules(&schedules)
    }

    /// Merge precomputed schedules.
    pub fn aggregate_schedules(
        schedules: &[LoanSchedule],
    ) -> Result<Vec<AggregatedMonth>, LoanError> {
        let max_months = schedules.iter().map(LoanSchedule::months).max().unwrap_or(0);
        let mut latest_paid = vec![Decimal::ZERO; schedules.len()];
        let mut months = Vec::with_capacity(max_months);

        for index in 0..max_months {
            let mut totals = MonthTotals::default();
            let mut entries = Vec::new();

            for (loan, schedule) in schedules.iter().enumerate() {
                let Some(entry) = schedule.entries().get(index) else {
                    continue;
                };
                totals.add(entry)?;
                latest_paid[loan] = entry.cumulative_paid;

                let mut shown = entry.clone();
                if index > 0 {
                    shown.principal_before = schedule.entries()[index - 1].principal_after;
                }
                entries.push(shown);
            }
            totals.cumulative_paid = latest_paid
                .iter()
                .try_fold(Decimal::ZERO, |acc, paid| checked_sum(acc, *paid, "total paid"))?;

            months.push(AggregatedMonth {
                month: index as u32 + 1,
                entries,
                totals,
            });
        }

        debug!(
            "aggregated {} loans over {} months",
            schedules.len(),
            max_months
        );
        Ok(months)
    }
}
