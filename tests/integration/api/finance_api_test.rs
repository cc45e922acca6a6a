use crate::helpers::{create_test_app, StubFetcher};
use axum::http::StatusCode;
use chrono::Utc;
use fincrawl::domain::repositories::finance_repository::FinanceRepository;
use fincrawl::domain::repositories::price_repository::PriceRepository;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_and_list_finances() {
    let app = create_test_app(StubFetcher::new().shared()).await;

    let response = app
        .server
        .post("/api/finances")
        .json(&json!({ "symbol": "AAPL:NASDAQ", "is_tracking": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["symbol"], "AAPL:NASDAQ");
    assert!(created["id"].is_number());

    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "GOOGL:NASDAQ" }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "TSLA:NASDAQ", "is_tracking": false }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.get("/api/finances").await;
    response.assert_status_ok();
    let list: Value = response.json();
    assert_eq!(
        list,
        json!([
            { "id": created["id"], "symbol": "AAPL:NASDAQ", "is_tracking": true },
            { "id": list[1]["id"], "symbol": "GOOGL:NASDAQ", "is_tracking": true },
            { "id": list[2]["id"], "symbol": "TSLA:NASDAQ", "is_tracking": false },
        ])
    );
}

#[tokio::test]
async fn test_create_rejects_invalid_and_duplicate() {
    let app = create_test_app(StubFetcher::new().shared()).await;

    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "X".repeat(51) }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "AAPL:NASDAQ" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/finances")
        .json(&json!({ "symbol": "AAPL:NASDAQ" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn test_get_finance_with_history() {
    let app = create_test_app(StubFetcher::new().shared()).await;
    let finance = app.repository.create("AAPL:NASDAQ", true).await.unwrap();
    app.repository
        .record_price(finance.id, dec!(150), Utc::now())
        .await
        .unwrap();

    let response = app.server.get("/api/finances/AAPL:NASDAQ").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["symbol"], "AAPL:NASDAQ");
    assert_eq!(body["last_closing_price"], json!(150.0));
    assert!(body.get("history").is_none());

    let response = app
        .server
        .get("/api/finances/AAPL:NASDAQ")
        .add_query_param("with_history", true)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["current_price"], json!(150.0));
}

#[tokio::test]
async fn test_get_finance_history_query_validation() {
    let app = create_test_app(StubFetcher::new().shared()).await;
    app.repository.create("AAPL:NASDAQ", true).await.unwrap();

    app.server
        .get("/api/finances/AAPL:NASDAQ")
        .add_query_param("with_history", true)
        .add_query_param("from_ts", "yesterday")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .get("/api/finances/AAPL:NASDAQ")
        .add_query_param("with_history", true)
        .add_query_param("from_ts", "2024-02-01")
        .add_query_param("to_ts", "2024-01-01")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/api/finances/AAPL:NASDAQ")
        .add_query_param("with_history", true)
        .add_query_param("from_ts", "2024-01-01")
        .add_query_param("to_ts", "2024-02-01")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["history"], json!([]));
}

#[tokio::test]
async fn test_update_and_delete_finance() {
    let app = create_test_app(StubFetcher::new().shared()).await;
    app.repository.create("AAPL:NASDAQ", false).await.unwrap();

    let response = app
        .server
        .put("/api/finances/AAPL:NASDAQ")
        .json(&json!({ "is_tracking": true, "last_closing_price": 99.5 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["symbol"], "AAPL:NASDAQ");

    let stored = app
        .repository
        .find_by_symbol("AAPL:NASDAQ")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_tracking);
    assert_eq!(stored.last_closing_price, Some(dec!(99.5)));

    app.server
        .delete("/api/finances/AAPL:NASDAQ")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .delete("/api/finances/AAPL:NASDAQ")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/api/finances/AAPL:NASDAQ")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_finance() {
    let app = create_test_app(StubFetcher::new().shared()).await;

    app.server
        .put("/api/finances/NOPE")
        .json(&json!({ "is_tracking": true }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = create_test_app(StubFetcher::new().shared()).await;

    let response = app.server.get("/api/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = app.server.get("/api/unknown/path").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Resource not found", "status": 404 }));
}
