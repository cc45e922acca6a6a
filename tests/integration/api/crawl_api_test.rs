use crate::helpers::{create_test_app, StubFetcher};
use axum::http::StatusCode;
use fincrawl::domain::repositories::finance_repository::FinanceRepository;
use fincrawl::engines::traits::PageFetchError;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::time::Duration;

/// 运行期间再次触发返回 409，结束后状态恢复可用
#[tokio::test]
async fn test_trigger_rejected_while_running() {
    let fetcher = StubFetcher::new()
        .quote("AAPL:NASDAQ", "$150.00")
        .with_delay(Duration::from_millis(300))
        .shared();
    let app = create_test_app(fetcher).await;
    app.repository.create("AAPL:NASDAQ", true).await.unwrap();

    let response = app.server.post("/api/finances/crawl").await;
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Request processor started.");
    assert!(body["run_id"].is_string());

    let response = app.server.post("/api/finances/crawl").await;
    response.assert_status(StatusCode::CONFLICT);
    let conflict: Value = response.json();
    assert_eq!(conflict["message"], "Request processor currently running.");

    let status: Value = app.server.get("/api/finances/crawl/status").await.json();
    assert_eq!(status["running"], true);
    assert_eq!(status["run_id"], body["run_id"]);
    assert_eq!(status["message"], "Request processor currently running");

    assert!(app.orchestrator.wait_idle(Duration::from_secs(5)).await);

    let status: Value = app.server.get("/api/finances/crawl/status").await.json();
    assert_eq!(status["running"], false);
    assert_eq!(status["message"], "Request processor is available");
    assert_eq!(status["last_summary"]["started"], 1);
    assert_eq!(status["last_summary"]["succeeded"], 1);
    assert_eq!(status["last_summary"]["recorded"], 1);

    app.server
        .post("/api/finances/crawl")
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert!(app.orchestrator.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_triggered_run_records_prices() {
    let fetcher = StubFetcher::new()
        .quote("AAPL:NASDAQ", "$150.00")
        .failing("GOOGL:NASDAQ", PageFetchError::Unexpected("boom".into()))
        .shared();
    let app = create_test_app(fetcher).await;
    app.repository.create("AAPL:NASDAQ", true).await.unwrap();
    app.repository.create("GOOGL:NASDAQ", true).await.unwrap();

    app.server
        .post("/api/finances/crawl")
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert!(app.orchestrator.wait_idle(Duration::from_secs(5)).await);

    let summary = app.orchestrator.last_summary().unwrap();
    assert_eq!(summary.started, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.recorded, 1);

    let aapl = app
        .repository
        .find_by_symbol("AAPL:NASDAQ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aapl.last_closing_price, Some(dec!(150)));

    let googl = app
        .repository
        .find_by_symbol("GOOGL:NASDAQ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(googl.last_closing_price, None);
}

/// 通过接口新建的标的无需额外设置即可被抓取
#[tokio::test]
async fn test_created_finance_is_crawled() {
    let fetcher = StubFetcher::new().quote("AAPL:NASDAQ", "$150.00").shared();
    let app = create_test_app(fetcher).await;

    app.server
        .post("/api/finances")
        .json(&json!({ "symbol": "AAPL:NASDAQ" }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/api/finances/crawl")
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert!(app.orchestrator.wait_idle(Duration::from_secs(5)).await);

    let status: Value = app.server.get("/api/finances/crawl/status").await.json();
    assert_eq!(status["last_summary"]["started"], 1);
    assert_eq!(status["last_summary"]["recorded"], 1);

    let details: Value = app
        .server
        .get("/api/finances/AAPL:NASDAQ")
        .add_query_param("with_history", true)
        .await
        .json();
    assert_eq!(details["last_closing_price"], json!(150.0));
    assert_eq!(details["history"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_status_before_any_run() {
    let app = create_test_app(StubFetcher::new().shared()).await;

    let response = app.server.get("/api/finances/crawl/status").await;
    response.assert_status_ok();
    let status: Value = response.json();
    assert_eq!(status["running"], false);
    assert!(status["run_id"].is_null());
    assert!(status["last_summary"].is_null());
}
