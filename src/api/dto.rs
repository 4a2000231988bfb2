//! JSON shapes exchanged over HTTP and written by the CLI.
//!
//! Both endpoints render the one canonical [`LedgerEntry`]. The single-loan
//! shape reports the remaining balance as `principal`; the portfolio shape
//! reports `originalPrincipal` and `remainingPrincipal` instead. Amounts are
//! emitted as JSON numbers.

use crate::amortization::aggregate::AggregatedMonth;
use crate::core::ledger::{LedgerEntry, LoanSchedule};
use crate::core::loan::{LoanError, LoanInput};
use rust_decimal::serde::{float, float_option};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One loan in a `POST /loan` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    #[serde(serialize_with = "float::serialize")]
    pub principal: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub interest_rate: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub monthly_payment: Decimal,
}

impl From<&LoanInput> for LoanRequest {
    fn from(input: &LoanInput) -> Self {
        Self {
            principal: input.principal(),
            interest_rate: input.annual_rate_percent(),
            monthly_payment: input.monthly_payment(),
        }
    }
}

impl TryFrom<LoanRequest> for LoanInput {
    type Error = LoanError;

    fn try_from(request: LoanRequest) -> Result<Self, Self::Error> {
        LoanInput::new(
            request.principal,
            request.interest_rate,
            request.monthly_payment,
        )
    }
}

/// Validate a whole request body, naming the first bad loan by index.
pub fn loans_from_requests(requests: Vec<LoanRequest>) -> Result<Vec<LoanInput>, LoanError> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| LoanInput::try_from(request).map_err(|e| e.in_loan(index)))
        .collect()
}

/// Wire form of a [`LedgerEntry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryJson {
    pub month: u32,
    #[serde(serialize_with = "float::serialize")]
    pub year: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub principal: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub original_principal: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub remaining_principal: Option<Decimal>,
    #[serde(serialize_with = "float::serialize")]
    pub interest_rate: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub monthly_payment: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub interest: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub principal_reduction: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_paid: Decimal,
}

impl LedgerEntryJson {
    fn base(entry: &LedgerEntry) -> Self {
        Self {
            month: entry.month,
            year: entry.year_fraction,
            principal: None,
            original_principal: None,
            remaining_principal: None,
            interest_rate: entry.interest_rate_percent,
            monthly_payment: entry.payment,
            interest: entry.interest,
            principal_reduction: entry.principal_portion,
            total_paid: entry.cumulative_paid,
        }
    }

    /// Single-loan shape: `principal` is the balance left after the month.
    pub fn single_loan(entry: &LedgerEntry) -> Self {
        Self {
            principal: Some(entry.principal_after),
            ..Self::base(entry)
        }
    }

    /// Portfolio shape: balance before and after the month.
    pub fn portfolio(entry: &LedgerEntry) -> Self {
        Self {
            original_principal: Some(entry.principal_before),
            remaining_principal: Some(entry.principal_after),
            ..Self::base(entry)
        }
    }
}

/// Wire form of an [`AggregatedMonth`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiLoanMonthJson {
    pub loan_details: Vec<LedgerEntryJson>,
    #[serde(serialize_with = "float::serialize")]
    pub total_original_principal: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_remaining_principal: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_monthly_payment: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_interest: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_principal_reduction: Decimal,
    #[serde(serialize_with = "float::serialize")]
    pub total_paid: Decimal,
}

impl From<&AggregatedMonth> for MultiLoanMonthJson {
    fn from(month: &AggregatedMonth) -> Self {
        Self {
            loan_details: month
                .entries
                .iter()
                .map(LedgerEntryJson::portfolio)
                .collect(),
            total_original_principal: month.totals.principal_before,
            total_remaining_principal: month.totals.principal_after,
            total_monthly_payment: month.totals.payment,
            total_interest: month.totals.interest,
            total_principal_reduction: month.totals.principal_portion,
            total_paid: month.totals.cumulative_paid,
        }
    }
}

/// `GET /loan` response: unrounded, one element per month.
pub fn single_loan_response(schedule: &LoanSchedule) -> Vec<LedgerEntryJson> {
    schedule
        .entries()
        .iter()
        .map(LedgerEntryJson::single_loan)
        .collect()
}

/// `POST /loan` response: every amount rounded to two decimal places.
pub fn portfolio_response(months: &[AggregatedMonth]) -> Vec<MultiLoanMonthJson> {
    months
        .iter()
        .map(|month| MultiLoanMonthJson::from(&month.rounded()))
        .collect()
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::aggregate::MultiLoanAggregator;
    use crate::amortization::engine::AmortizationEngine;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn schedule() -> LoanSchedule {
        let input = LoanInput::new(dec!(3_000_000), dec!(10), dec!(100_000)).unwrap();
        AmortizationEngine::default().compute_schedule(&input).unwrap()
    }

    #[test]
    fn test_request_parses_numbers_and_strings() {
        let requests: Vec<LoanRequest> = serde_json::from_value(json!([
            {"principal": 100000, "interestRate": 3.5, "monthlyPayment": 5000},
            {"principal": "200000", "interestRate": "0", "monthlyPayment": "50000"}
        ]))
        .unwrap();
        assert_eq!(requests[0].interest_rate, dec!(3.5));
        assert_eq!(requests[1].principal, dec!(200_000));
    }

    #[test]
    fn test_request_missing_field_rejected() {
        let result: Result<Vec<LoanRequest>, _> =
            serde_json::from_value(json!([{"principal": 100000, "interestRate": 3.5}]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_request_names_index() {
        let requests = vec![
            LoanRequest {
                principal: dec!(1000),
                interest_rate: dec!(1),
                monthly_payment: dec!(100),
            },
            LoanRequest {
                principal: dec!(-1000),
                interest_rate: dec!(1),
                monthly_payment: dec!(100),
            },
        ];
        let err = loans_from_requests(requests).unwrap_err();
        assert!(matches!(err, LoanError::InLoan { index: 1, .. }));
    }

    #[test]
    fn test_single_loan_shape() {
        let body = serde_json::to_value(single_loan_response(&schedule())).unwrap();
        let first = &body[0];
        assert_eq!(first["month"], json!(1));
        assert_relative_eq!(first["principal"].as_f64().unwrap(), 2_925_000.0);
        assert_relative_eq!(first["interest"].as_f64().unwrap(), 25_000.0);
        assert_relative_eq!(first["principalReduction"].as_f64().unwrap(), 75_000.0);
        assert_relative_eq!(first["totalPaid"].as_f64().unwrap(), 100_000.0);
        assert!(first.get("originalPrincipal").is_none());
        assert!(first.get("remainingPrincipal").is_none());
    }

    #[test]
    fn test_portfolio_shape_is_rounded() {
        let loans = [LoanInput::new(dec!(1000), dec!(7), dec!(100)).unwrap()];
        let months = MultiLoanAggregator::default().aggregate(&loans).unwrap();
        let body = serde_json::to_value(portfolio_response(&months)).unwrap();

        let first = &body[0];
        assert_relative_eq!(first["totalInterest"].as_f64().unwrap(), 5.83);
        assert_relative_eq!(first["totalRemainingPrincipal"].as_f64().unwrap(), 905.83);
        let detail = &first["loanDetails"][0];
        assert_relative_eq!(detail["year"].as_f64().unwrap(), 0.08);
        assert_relative_eq!(detail["originalPrincipal"].as_f64().unwrap(), 1000.0);
        assert_relative_eq!(detail["remainingPrincipal"].as_f64().unwrap(), 905.83);
        assert!(detail.get("principal").is_none());
    }
}
