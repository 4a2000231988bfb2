//! Multi-loan aggregation example.
//!
//! A household carrying a mortgage, a car loan and a student loan. The
//! monthly totals shrink as each loan is paid off.

use loan_engine::amortization::aggregate::MultiLoanAggregator;
use loan_engine::amortization::engine::AmortizationEngine;
use loan_engine::api::dto::portfolio_response;
use loan_engine::core::loan::LoanInput;
use loan_engine::core::rounding::round_presentation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  loan-engine: Loan Portfolio Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let loans = [
        ("Mortgage", LoanInput::new(dec!(3_000_000), dec!(10), dec!(100_000))?),
        ("Car", LoanInput::new(dec!(200_000), dec!(0), dec!(50_000))?),
        ("Student", LoanInput::new(dec!(150_000), dec!(4.25), dec!(7_500))?),
    ];

    println!("━━━ Loans ━━━\n");
    for (name, loan) in &loans {
        println!("  {:<10} {}", name, loan);
    }
    println!();

    let inputs: Vec<LoanInput> = loans.iter().map(|(_, loan)| *loan).collect();
    let months = MultiLoanAggregator::default().aggregate(&inputs)?;

    // --- Month-by-month totals ---
    println!("━━━ Monthly Totals ━━━\n");
    println!(
        "  {:>5}  {:>6}  {:>14}  {:>12}  {:>16}",
        "Month", "Loans", "Payment", "Interest", "Remaining"
    );
    for month in &months {
        let totals = month.totals.rounded();
        println!(
            "  {:>5}  {:>6}  {:>14.2}  {:>12.2}  {:>16.2}",
            month.month,
            month.active_loans(),
            totals.payment,
            totals.interest,
            totals.principal_after
        );
    }

    // --- Payoff months ---
    println!("\n━━━ Payoff ━━━\n");
    let engine = AmortizationEngine::default();
    for (name, loan) in &loans {
        let schedule = engine.compute_schedule(loan)?;
        println!(
            "  {:<10} paid off in month {:>3}, interest {:.2}",
            name,
            schedule.months(),
            round_presentation(schedule.total_interest())
        );
    }

    let total_interest: Decimal = months.iter().map(|m| m.totals.interest).sum();
    let total_paid = months
        .last()
        .map(|m| m.totals.cumulative_paid)
        .unwrap_or_default();
    println!("\n  Total interest: {:.2}", round_presentation(total_interest));
    println!("  Total paid:     {:.2}\n", round_presentation(total_paid));

    // --- The same months as the POST /loan response ---
    println!("━━━ First month as JSON ━━━\n");
    let wire = portfolio_response(&months[..months.len().min(1)]);
    println!("{}", serde_json::to_string_pretty(&wire)?);

    Ok(())
}
