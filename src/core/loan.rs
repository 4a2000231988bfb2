use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Months per year; the schedule only supports monthly payments.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Errors arising from loan validation and schedule computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("monthly payment {payment} does not cover the first month's interest of {interest}")]
    UnpayableLoan { payment: Decimal, interest: Decimal },
    #[error("loan not repaid within {cap} months ({remaining} still outstanding)")]
    MonthCapExceeded { cap: u32, remaining: Decimal },
    #[error("amounts too large: {what} overflowed")]
    Overflow { what: &'static str },
    #[error("loan #{index}: {source}")]
    InLoan {
        index: usize,
        #[source]
        source: Box<LoanError>,
    },
}

impl LoanError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(what: &'static str) -> Self {
        LoanError::Overflow { what }
    }

    /// Attach the position of the offending loan within a portfolio.
    pub fn in_loan(self, index: usize) -> Self {
        LoanError::InLoan {
            index,
            source: Box::new(self),
        }
    }
}

/// The three terms that fully describe a fixed-payment loan.
///
/// Values are only reachable through [`LoanInput::new`] or
/// [`LoanInput::parse`], so every `LoanInput` in circulation has a
/// non-negative principal and rate and a non-negative payment.
///
/// # Examples
///
/// ```
/// use loan_engine::core::loan::LoanInput;
/// use rust_decimal_macros::dec;
///
/// let loan = LoanInput::new(dec!(3_000_000), dec!(10), dec!(100_000)).unwrap();
/// assert_eq!(loan.first_month_interest(), Ok(dec!(25_000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInput {
    principal: Decimal,
    annual_rate_percent: Decimal,
    monthly_payment: Decimal,
}

impl LoanInput {
    pub fn new(
        principal: Decimal,
        annual_rate_percent: Decimal,
        monthly_payment: Decimal,
    ) -> Result<Self, LoanError> {
        if principal < Decimal::ZERO {
            return Err(LoanError::invalid("principal", format!("{principal} is negative")));
        }
        if annual_rate_percent < Decimal::ZERO {
            return Err(LoanError::invalid(
                "interest rate",
                format!("{annual_rate_percent} is negative"),
            ));
        }
        if monthly_payment < Decimal::ZERO {
            return Err(LoanError::invalid(
                "monthly payment",
                format!("{monthly_payment} is negative"),
            ));
        }
        Ok(Self {
            principal,
            annual_rate_percent,
            monthly_payment,
        })
    }

    /// Parse the three terms from text, as typed at a prompt or passed in a
    /// query string. Surrounding whitespace is ignored.
    pub fn parse(
        principal: &str,
        annual_rate_percent: &str,
        monthly_payment: &str,
    ) -> Result<Self, LoanError> {
        Self::new(
            parse_field("principal", principal)?,
            parse_field("interest rate", annual_rate_percent)?,
            parse_field("monthly payment", monthly_payment)?,
        )
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn monthly_payment(&self) -> Decimal {
        self.monthly_payment
    }

    /// Interest accrued on `balance` over one month.
    ///
    /// Multiplies before dividing so whole-number inputs stay exact. Fails
    /// with [`LoanError::Overflow`] when the product exceeds `Decimal::MAX`.
    pub fn interest_on(&self, balance: Decimal) -> Result<Decimal, LoanError> {
        balance
            .checked_mul(self.annual_rate_percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|v| v.checked_div(Decimal::from(MONTHS_PER_YEAR)))
            .ok_or_else(|| LoanError::overflow("interest"))
    }

    pub fn first_month_interest(&self) -> Result<Decimal, LoanError> {
        self.interest_on(self.principal)
    }

    /// A loan is payable when the payment strictly exceeds the interest on
    /// the opening balance; from then on the balance falls every month.
    /// Interest too large to represent is never payable.
    pub fn is_payable(&self) -> bool {
        self.monthly_payment > Decimal::ZERO
            && self
                .first_month_interest()
                .map_or(false, |interest| self.monthly_payment > interest)
    }
}

impl fmt::Display for LoanInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal {} at {}% paying {} per month",
            self.principal, self.annual_rate_percent, self.monthly_payment
        )
    }
}

/// Parse a single decimal field, naming the field on failure.
pub fn parse_field(field: &'static str, raw: &str) -> Result<Decimal, LoanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LoanError::invalid(field, "value is missing"));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| LoanError::invalid(field, format!("'{trimmed}' is not a number ({e})")))
}
