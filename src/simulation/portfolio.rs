//! Random loan portfolios for benchmarking and load testing.
//!
//! Every generated loan is payable and repays within its drawn term, so a
//! portfolio can be fed straight into the aggregator.

use crate::core::loan::LoanInput;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

/// Configuration for generating a random loan portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Number of loans to generate.
    pub loan_count: usize,
    /// Principal bounds, whole currency units.
    pub min_principal: u64,
    pub max_principal: u64,
    /// Annual rate bounds in basis points (100 = 1%).
    pub min_rate_bp: u32,
    pub max_rate_bp: u32,
    /// Target repayment term bounds in months.
    pub min_term_months: u32,
    pub max_term_months: u32,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            loan_count: 10,
            min_principal: 10_000,
            max_principal: 5_000_000,
            min_rate_bp: 0,
            max_rate_bp: 1_500,
            min_term_months: 12,
            max_term_months: 360,
        }
    }
}

/// Generate a random portfolio.
///
/// The monthly payment is the straight-line principal share plus the first
/// month's interest, rounded up to the cent. Since interest only shrinks,
/// each month repays at least `principal / term`.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> Vec<LoanInput> {
    let mut rng = rand::thread_rng();

    let max_principal = config.max_principal.max(config.min_principal);
    let max_rate_bp = config.max_rate_bp.max(config.min_rate_bp);
    let min_term = config.min_term_months.max(1);
    let max_term = config.max_term_months.max(min_term);

    (0..config.loan_count)
        .filter_map(|_| {
            let principal = Decimal::from(rng.gen_range(config.min_principal..=max_principal));
            let rate = Decimal::new(i64::from(rng.gen_range(config.min_rate_bp..=max_rate_bp)), 2);
            let term = Decimal::from(rng.gen_range(min_term..=max_term));

            let interest = principal * rate / Decimal::ONE_HUNDRED / Decimal::from(12);
            let payment = (principal / term + interest)
                .round_dp_with_strategy(2, RoundingStrategy::AwayFromZero);

            LoanInput::new(principal, rate, payment).ok()
        })
        .filter(LoanInput::is_payable)
        .collect()
}
