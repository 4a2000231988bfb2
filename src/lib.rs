//! # loan-engine
//!
//! Loan amortization schedules and multi-loan aggregation.
//!
//! Given a principal, an annual interest rate and a fixed monthly payment,
//! the engine produces the month-by-month breakdown of interest, principal
//! reduction, remaining balance and cumulative paid until the loan is
//! repaid. Several loans can be merged month by month into portfolio totals.
//!
//! ## Architecture
//!
//! - **core** — Loan terms, ledger entries, presentation rounding
//! - **amortization** — Single-loan engine and multi-loan aggregator
//! - **api** — HTTP router and JSON wire shapes
//! - **console** — Interactive terminal prompt
//! - **simulation** — Random loan portfolios

pub mod amortization;
pub mod api;
pub mod console;
pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::amortization::aggregate::{AggregatedMonth, MonthTotals, MultiLoanAggregator};
    pub use crate::amortization::engine::{AmortizationEngine, ScheduleLimits};
    pub use crate::core::ledger::{LedgerEntry, LoanSchedule};
    pub use crate::core::loan::{LoanError, LoanInput};
    pub use crate::core::rounding::round_presentation;
}
