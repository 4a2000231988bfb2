//! loan-engine CLI
//!
//! Amortization schedules from the command line, or served over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Prompt for a loan and print its schedule
//! loan-engine interactive
//!
//! # One loan, no prompts
//! loan-engine schedule --principal 3000000 --rate 10 --payment 100000
//!
//! # Aggregate a portfolio (same JSON as the POST /loan body)
//! loan-engine portfolio --input loans.json --format json
//!
//! # Serve GET/POST /loan on port 8080
//! loan-engine serve --port 8080
//!
//! # Generate a random portfolio for testing
//! loan-engine generate --loans 20 --output loans.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use loan_engine::amortization::aggregate::MultiLoanAggregator;
use loan_engine::amortization::engine::{AmortizationEngine, ScheduleLimits, DEFAULT_MAX_MONTHS};
use loan_engine::api::dto::{
    loans_from_requests, portfolio_response, single_loan_response, LoanRequest,
};
use loan_engine::api::server::{self, ServerConfig, DEFAULT_PORT};
use loan_engine::console::prompt::Prompt;
use loan_engine::core::loan::LoanInput;
use loan_engine::core::rounding::round_presentation;
use loan_engine::simulation::portfolio::{generate_random_portfolio, PortfolioConfig};
use rust_decimal::Decimal;
use std::error::Error;
use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "loan-engine")]
#[command(version, about = "Loan amortization schedules and multi-loan aggregation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Prompt for principal, rate and payment, then print the schedule (default)
    Interactive {
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Print the schedule of a single loan
    Schedule {
        /// Amount borrowed
        #[arg(long)]
        principal: String,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: String,
        /// Fixed monthly payment
        #[arg(long)]
        payment: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Aggregate a portfolio of loans read from a JSON file
    Portfolio {
        /// JSON array of {principal, interestRate, monthlyPayment}
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Serve GET /loan and POST /loan
    Serve {
        /// Listening port
        #[arg(long, env = "LOAN_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Listening address
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Generate a random loan portfolio (for testing)
    Generate {
        /// Number of loans
        #[arg(long, default_value_t = 10)]
        loans: usize,
        /// Longest repayment term in months
        #[arg(long, default_value_t = 360)]
        max_term: u32,
        /// Write to file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Copy)]
struct LimitArgs {
    /// Give up on schedules longer than this many months
    #[arg(long, default_value_t = DEFAULT_MAX_MONTHS)]
    max_months: u32,
}

impl Default for LimitArgs {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
        }
    }
}

impl From<LimitArgs> for ScheduleLimits {
    fn from(args: LimitArgs) -> Self {
        ScheduleLimits {
            max_months: args.max_months,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn cmd_interactive(limits: LimitArgs) -> CliResult {
    let engine = AmortizationEngine::new(limits.into());
    let stdin = io::stdin();
    let stdout = io::stdout();
    Prompt::new(stdin.lock(), stdout.lock()).run(&engine)?;
    Ok(())
}

fn cmd_schedule(
    principal: &str,
    rate: &str,
    payment: &str,
    format: Format,
    limits: LimitArgs,
) -> CliResult {
    let input = LoanInput::parse(principal, rate, payment)?;
    let schedule = AmortizationEngine::new(limits.into()).compute_schedule(&input)?;

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&single_loan_response(&schedule))?;
            println!("{}", json);
        }
        Format::Text => print!("{}", schedule),
    }
    Ok(())
}

fn cmd_portfolio(input: &Path, format: Format, limits: LimitArgs) -> CliResult {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("reading '{}': {}", input.display(), e))?;
    let requests: Vec<LoanRequest> = serde_json::from_str(&content).map_err(|e| {
        format!(
            "parsing '{}': {}\nExpected format:\n{}",
            input.display(),
            e,
            r#"[
  { "principal": 3000000, "interestRate": 10, "monthlyPayment": 100000 }
]"#
        )
    })?;

    let loans = loans_from_requests(requests)?;
    let aggregator = MultiLoanAggregator::new(AmortizationEngine::new(limits.into()));
    let months = aggregator.aggregate(&loans)?;

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&portfolio_response(&months))?;
            println!("{}", json);
        }
        Format::Text => {
            println!("=== Portfolio of {} loans ===", loans.len());
            for month in &months {
                print!("{}", month);
            }
            let total_paid = months
                .last()
                .map(|m| m.totals.cumulative_paid)
                .unwrap_or_default();
            let total_interest: Decimal = months.iter().map(|m| m.totals.interest).sum();
            println!("\nMonths:          {}", months.len());
            println!("Total Interest:  {:.2}", round_presentation(total_interest));
            println!("Total Paid:      {:.2}", round_presentation(total_paid));
        }
    }
    Ok(())
}

fn cmd_serve(port: u16, bind: IpAddr, limits: LimitArgs) -> CliResult {
    let config = ServerConfig {
        bind,
        port,
        limits: limits.into(),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(config))?;
    Ok(())
}

fn cmd_generate(loans: usize, max_term: u32, output: Option<PathBuf>) -> CliResult {
    let config = PortfolioConfig {
        loan_count: loans,
        max_term_months: max_term,
        ..Default::default()
    };
    let portfolio = generate_random_portfolio(&config);
    let requests: Vec<LoanRequest> = portfolio.iter().map(LoanRequest::from).collect();
    let json = serde_json::to_string_pretty(&requests)?;

    if let Some(path) = output {
        fs::write(&path, &json).map_err(|e| format!("writing '{}': {}", path.display(), e))?;
        eprintln!("Generated {} loans → {}", requests.len(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Interactive {
        limits: LimitArgs::default(),
    });

    let result = match command {
        Command::Interactive { limits } => cmd_interactive(limits),
        Command::Schedule {
            principal,
            rate,
            payment,
            format,
            limits,
        } => cmd_schedule(&principal, &rate, &payment, format, limits),
        Command::Portfolio {
            input,
            format,
            limits,
        } => cmd_portfolio(&input, format, limits),
        Command::Serve { port, bind, limits } => cmd_serve(port, bind, limits),
        Command::Generate {
            loans,
            max_term,
            output,
        } => cmd_generate(loans, max_term, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
