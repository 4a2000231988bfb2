//! Single loan amortization example.
//!
//! Walks one mortgage through its schedule and shows what happens when
//! the payment cannot keep up with the interest.

use loan_engine::amortization::engine::{AmortizationEngine, ScheduleLimits};
use loan_engine::core::loan::{LoanError, LoanInput};
use loan_engine::core::rounding::round_presentation;
use rust_decimal_macros::dec;

fn main() -> Result<(), LoanError> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  loan-engine: Single Loan Example        ║");
    println!("╚══════════════════════════════════════════╝\n");

    // --- Scenario 1: A mortgage paid off in under three years ---
    println!("━━━ Scenario 1: 3,000,000 at 10% paying 100,000 ━━━\n");

    let engine = AmortizationEngine::default();
    let mortgage = LoanInput::new(dec!(3_000_000), dec!(10), dec!(100_000))?;
    let schedule = engine.compute_schedule(&mortgage)?;
    print!("{}", schedule);

    if let Some(last) = schedule.final_entry() {
        println!("Final payment:   {:.2}", round_presentation(last.payment));
    }
    println!();

    // --- Scenario 2: Interest outruns the payment ---
    println!("━━━ Scenario 2: Payment below the first month's interest ━━━\n");

    let underwater = LoanInput::new(dec!(3_000_000), dec!(10), dec!(20_000))?;
    match engine.compute_schedule(&underwater) {
        Ok(_) => println!("Unexpectedly repaid"),
        Err(e) => println!("Rejected: {}\n", e),
    }

    // --- Scenario 3: Payable, but slower than the month cap allows ---
    println!("━━━ Scenario 3: A 10-year cap on a slow loan ━━━\n");

    let capped = AmortizationEngine::new(ScheduleLimits { max_months: 120 });
    let slow = LoanInput::new(dec!(1_000_000), dec!(12), dec!(10_500))?;
    match capped.compute_schedule(&slow) {
        Ok(schedule) => println!("Repaid in {} months", schedule.months()),
        Err(e) => println!("Rejected: {}", e),
    }

    Ok(())
}
