use approx::assert_relative_eq;
use loan_engine::amortization::engine::ScheduleLimits;
use loan_engine::api::server;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start a server on an ephemeral port and return its base URL.
async fn spawn_server(limits: ScheduleLimits) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(listener, limits));
    format!("http://{}", addr)
}

async fn post_loans(base: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/loan", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

fn number(value: &Value) -> f64 {
    value.as_f64().unwrap()
}

#[tokio::test]
async fn post_loan_aggregates_and_drops_finished_loans() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (status, body) = post_loans(
        &base,
        json!([
            {"principal": 100000, "interestRate": 0, "monthlyPayment": 50000},
            {"principal": 200000, "interestRate": 0, "monthlyPayment": 50000}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let months = body.as_array().unwrap();
    assert_eq!(months.len(), 4);

    let payments: Vec<f64> = months
        .iter()
        .map(|m| number(&m["totalMonthlyPayment"]))
        .collect();
    assert_eq!(payments, vec![100_000.0, 100_000.0, 50_000.0, 50_000.0]);

    assert_eq!(months[1]["loanDetails"].as_array().unwrap().len(), 2);
    assert_eq!(months[2]["loanDetails"].as_array().unwrap().len(), 1);
    assert_relative_eq!(number(&months[3]["totalPaid"]), 300_000.0);
    assert_relative_eq!(number(&months[3]["totalRemainingPrincipal"]), 0.0);
}

#[tokio::test]
async fn post_loan_rounds_to_cents() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (status, body) = post_loans(
        &base,
        json!([{"principal": 1000, "interestRate": 7, "monthlyPayment": 100}]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let first = &body[0];
    assert_relative_eq!(number(&first["totalInterest"]), 5.83);
    let detail = &first["loanDetails"][0];
    assert_eq!(detail["month"], json!(1));
    assert_relative_eq!(number(&detail["year"]), 0.08);
    assert_relative_eq!(number(&detail["originalPrincipal"]), 1000.0);
    assert_relative_eq!(number(&detail["remainingPrincipal"]), 905.83);
    assert_relative_eq!(number(&detail["principalReduction"]), 94.17);
    assert!(detail.get("principal").is_none());
}

#[tokio::test]
async fn post_loan_first_month_example() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (_, body) = post_loans(
        &base,
        json!([{"principal": 3000000, "interestRate": 10, "monthlyPayment": 100000}]),
    )
    .await;

    let detail = &body[0]["loanDetails"][0];
    assert_relative_eq!(number(&detail["interest"]), 25_000.0);
    assert_relative_eq!(number(&detail["principalReduction"]), 75_000.0);
    assert_relative_eq!(number(&detail["remainingPrincipal"]), 2_925_000.0);
    assert_relative_eq!(number(&detail["totalPaid"]), 100_000.0);
}

#[tokio::test]
async fn post_loan_malformed_json_is_client_error() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/loan", base))
        .header("content-type", "application/json")
        .body("[{\"principal\": 1000,")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("malformed request"));
}

#[tokio::test]
async fn post_loan_wrong_shape_is_client_error() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (status, body) = post_loans(&base, json!({"principal": 1000})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post_loans(
        &base,
        json!([{"principal": "lots", "interestRate": 1, "monthlyPayment": 10}]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_loan_rejects_unpayable_loan_without_partial_results() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (status, body) = post_loans(
        &base,
        json!([
            {"principal": 100000, "interestRate": 0, "monthlyPayment": 50000},
            {"principal": 3000000, "interestRate": 10, "monthlyPayment": 0}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.is_object());
    assert!(body["error"].as_str().unwrap().starts_with("loan #1:"));
}

#[tokio::test]
async fn post_loan_rejects_negative_values() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let (status, body) = post_loans(
        &base,
        json!([{"principal": -5, "interestRate": 1, "monthlyPayment": 10}]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid principal"));
}

#[tokio::test]
async fn post_loan_respects_month_cap() {
    let base = spawn_server(ScheduleLimits { max_months: 6 }).await;
    let (status, body) = post_loans(
        &base,
        json!([{"principal": 100000, "interestRate": 0, "monthlyPayment": 10000}]),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("within 6 months"));
}

#[tokio::test]
async fn get_loan_returns_unrounded_single_schedule() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let response = reqwest::get(format!(
        "{}/loan?principal=1000&interestRate=7&monthlyPayment=100",
        base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let months = body.as_array().unwrap();
    assert_eq!(months.len(), 11);

    let first = &months[0];
    assert_relative_eq!(number(&first["interest"]), 1000.0 * 0.07 / 12.0, epsilon = 1e-9);
    assert_relative_eq!(number(&first["principal"]), 1000.0 - (100.0 - 70.0 / 12.0), epsilon = 1e-9);
    assert_relative_eq!(number(&first["year"]), 1.0 / 12.0, epsilon = 1e-9);
    assert_relative_eq!(number(&first["interestRate"]), 7.0);
    assert!(first.get("originalPrincipal").is_none());
    assert_relative_eq!(number(&months[10]["principal"]), 0.0);
}

#[tokio::test]
async fn get_loan_names_invalid_field() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let response = reqwest::get(format!(
        "{}/loan?principal=1000&interestRate=seven&monthlyPayment=100",
        base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid interest rate"));

    let response = reqwest::get(format!("{}/loan?principal=1000&interestRate=7", base))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        json!("invalid monthly payment: value is missing")
    );
}

#[tokio::test]
async fn health_check() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn post_loan_total_overflow_is_reported() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let big = json!({
        "principal": "50000000000000000000000000000",
        "interestRate": 0,
        "monthlyPayment": "50000000000000000000000000000"
    });
    let (status, body) = post_loans(&base, json!([big.clone(), big])).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("overflowed"));
}

#[tokio::test]
async fn get_loan_interest_overflow_is_reported() {
    let base = spawn_server(ScheduleLimits::default()).await;
    let response = reqwest::get(format!(
        "{}/loan?principal=10000000000000000000000000000&interestRate=10&monthlyPayment=10000000000000000000000000000",
        base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], json!("amounts too large: interest overflowed"));
}
