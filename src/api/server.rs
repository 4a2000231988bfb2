use crate::amortization::aggregate::MultiLoanAggregator;
use crate::amortization::engine::{AmortizationEngine, ScheduleLimits};
use crate::api::dto::{
    loans_from_requests, portfolio_response, single_loan_response, ErrorBody, LedgerEntryJson,
    LoanRequest, MultiLoanMonthJson,
};
use crate::core::loan::{LoanError, LoanInput};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Where and how the HTTP server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub limits: ScheduleLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            limits: ScheduleLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Loan(#[from] LoanError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Loan(e) => loan_status(e),
        }
    }
}

fn loan_status(error: &LoanError) -> StatusCode {
    match error {
        LoanError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        LoanError::UnpayableLoan { .. }
        | LoanError::MonthCapExceeded { .. }
        | LoanError::Overflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LoanError::InLoan { source, .. } => loan_status(source),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("rejected request ({}): {}", status, self);
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Per-server state shared by every handler. Immutable; each request
/// computes its own schedules.
#[derive(Debug, Clone, Copy)]
struct AppState {
    engine: AmortizationEngine,
    aggregator: MultiLoanAggregator,
}

impl AppState {
    fn new(limits: ScheduleLimits) -> Self {
        let engine = AmortizationEngine::new(limits);
        Self {
            engine,
            aggregator: MultiLoanAggregator::new(engine),
        }
    }
}

/// Query string of `GET /loan`. Every field is read as text so a bad
/// value is reported by name rather than as a generic query error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanQuery {
    principal: Option<String>,
    interest_rate: Option<String>,
    monthly_payment: Option<String>,
}

/// Build the application router.
pub fn router(limits: ScheduleLimits) -> Router {
    Router::new()
        .route("/loan", get(single_loan).post(portfolio))
        .route("/health", get(health))
        .with_state(AppState::new(limits))
}

/// Bind the configured address and serve until the process stops.
pub async fn serve(config: ServerConfig) -> io::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve_on(listener, config.limits).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, limits: ScheduleLimits) -> io::Result<()> {
    info!(
        "loan engine listening on {} (max {} months per schedule)",
        listener.local_addr()?,
        limits.max_months
    );
    axum::serve(listener, router(limits)).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn single_loan(
    State(state): State<AppState>,
    query: Result<Query<LoanQuery>, QueryRejection>,
) -> Result<Json<Vec<LedgerEntryJson>>, ApiError> {
    let Query(query) = query?;
    let input = LoanInput::parse(
        query.principal.as_deref().unwrap_or_default(),
        query.interest_rate.as_deref().unwrap_or_default(),
        query.monthly_payment.as_deref().unwrap_or_default(),
    )?;
    let schedule = state.engine.compute_schedule(&input)?;
    Ok(Json(single_loan_response(&schedule)))
}

async fn portfolio(
    State(state): State<AppState>,
    body: Result<Json<Vec<LoanRequest>>, JsonRejection>,
) -> Result<Json<Vec<MultiLoanMonthJson>>, ApiError> {
    let Json(requests) = body?;
    let loans = loans_from_requests(requests)?;
    let months = state.aggregator.aggregate(&loans)?;
    info!(
        "aggregated {} loans over {} months",
        loans.len(),
        months.len()
    );
    Ok(Json(portfolio_response(&months)))
}
