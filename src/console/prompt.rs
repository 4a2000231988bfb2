use crate::amortization::engine::AmortizationEngine;
use crate::core::ledger::LoanSchedule;
use crate::core::loan::{parse_field, LoanError, LoanInput};
use log::debug;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors ending an interactive session.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("input ended before the {0} was entered")]
    EndOfInput(&'static str),
    #[error(transparent)]
    Loan(#[from] LoanError),
}

/// Line-oriented session: asks for the three loan terms, then prints the
/// schedule one month per line.
///
/// Unparsable or negative answers are reported by field name and asked
/// again; an unpayable loan ends the session with an error.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read answers until they form a valid loan.
    pub fn read_loan(&mut self) -> Result<LoanInput, PromptError> {
        loop {
            let principal = self.ask("principal", "Principal (e.g. 3000000)")?;
            let rate = self.ask("interest rate", "Annual interest rate in % (e.g. 10)")?;
            let payment = self.ask("monthly payment", "Monthly payment (e.g. 100000)")?;

            match LoanInput::new(principal, rate, payment) {
                Ok(loan) => return Ok(loan),
                Err(e) => writeln!(self.output, "{e}, please start again")?,
            }
        }
    }

    /// Run a full session and return the schedule that was printed.
    pub fn run(&mut self, engine: &AmortizationEngine) -> Result<LoanSchedule, PromptError> {
        let loan = self.read_loan()?;
        debug!("interactive session: {}", loan);
        let schedule = engine.compute_schedule(&loan)?;
        for entry in schedule.entries() {
            writeln!(self.output, "{}", entry)?;
        }
        self.output.flush()?;
        Ok(schedule)
    }

    fn ask(&mut self, field: &'static str, label: &str) -> Result<Decimal, PromptError> {
        loop {
            write!(self.output, "{}: ", label)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PromptError::EndOfInput(field));
            }
            match parse_field(field, &line) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{e}, please try again")?,
            }
        }
    }
}
