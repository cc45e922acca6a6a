use crate::helpers::{build_orchestrator, create_test_db, StubFetcher};
use chrono::{Duration, Utc};
use fincrawl::domain::repositories::finance_repository::FinanceRepository;
use fincrawl::domain::services::crawl_orchestrator::CrawlError;
use fincrawl::engines::traits::PageFetchError;
use fincrawl::infrastructure::repositories::finance_repo_impl::FinanceRepositoryImpl;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// 完整运行：成功的标的写入历史，失败和未跟踪的标的保持不变
#[tokio::test]
async fn test_run_persists_successful_prices_only() {
    let repository = Arc::new(FinanceRepositoryImpl::new(create_test_db().await));
    let aapl = repository.create("AAPL:NASDAQ", true).await.unwrap();
    let googl = repository.create("GOOGL:NASDAQ", true).await.unwrap();
    let msft = repository.create("MSFT:NASDAQ", false).await.unwrap();

    let fetcher = StubFetcher::new()
        .quote("AAPL:NASDAQ", "$150.00")
        .quote("MSFT:NASDAQ", "$400.00")
        .failing("GOOGL:NASDAQ", PageFetchError::Timeout("no price".into()))
        .shared();
    let orchestrator = build_orchestrator(repository.clone(), fetcher);

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(summary.started, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.persist_failed, 0);
    assert!(!summary.degraded);

    let window = (Utc::now() - Duration::hours(1), Utc::now() + Duration::hours(1));
    let history = repository
        .find_history(aapl.id, window.0, window.1)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].current_price, dec!(150));

    for id in [googl.id, msft.id] {
        let history = repository.find_history(id, window.0, window.1).await.unwrap();
        assert!(history.is_empty());
    }
    let msft = repository.find_by_symbol("MSFT:NASDAQ").await.unwrap().unwrap();
    assert_eq!(msft.last_closing_price, None);
}

#[tokio::test]
async fn test_runs_append_history() {
    let repository = Arc::new(FinanceRepositoryImpl::new(create_test_db().await));
    let aapl = repository.create("AAPL:NASDAQ", true).await.unwrap();
    let orchestrator = build_orchestrator(
        repository.clone(),
        StubFetcher::new().quote("AAPL:NASDAQ", "150.00").shared(),
    );

    orchestrator.run().await.unwrap();
    orchestrator.run().await.unwrap();

    let history = repository
        .find_history(
            aapl.id,
            Utc::now() - Duration::hours(1),
            Utc::now() + Duration::hours(1),
        )
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_concurrent_run_rejected() {
    let repository = Arc::new(FinanceRepositoryImpl::new(create_test_db().await));
    repository.create("AAPL:NASDAQ", true).await.unwrap();
    let orchestrator = build_orchestrator(
        repository,
        StubFetcher::new()
            .quote("AAPL:NASDAQ", "150.00")
            .with_delay(std::time::Duration::from_millis(200))
            .shared(),
    );

    let first = orchestrator.trigger().unwrap();
    assert!(matches!(orchestrator.run().await, Err(CrawlError::AlreadyRunning)));

    let summary = first.handle.await.unwrap().unwrap();
    assert_eq!(summary.run_id, first.run_id);
    assert_eq!(summary.recorded, 1);
    assert!(!orchestrator.is_running());
}
