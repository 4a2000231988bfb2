//! Foundational types: loan terms, ledger entries, presentation rounding.

pub mod ledger;
pub mod loan;
pub mod rounding;
