use crate::helpers::create_test_db;
use chrono::{Duration, TimeZone, Utc};
use fincrawl::domain::models::finance::FinanceUpdate;
use fincrawl::domain::repositories::finance_repository::FinanceRepository;
use fincrawl::domain::repositories::price_repository::PriceRepository;
use fincrawl::infrastructure::database::entities::finance_history;
use fincrawl::infrastructure::repositories::finance_repo_impl::FinanceRepositoryImpl;
use fincrawl::utils::errors::RepositoryError;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

/// 只返回已跟踪的标的，并按ID排序
#[tokio::test]
async fn test_list_tracked_symbols_filters_and_orders() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);

    repo.create("MSFT:NASDAQ", true).await.unwrap();
    repo.create("TSLA:NASDAQ", false).await.unwrap();
    repo.create("AAPL:NASDAQ", true).await.unwrap();

    let tracked = repo.list_tracked_symbols().await.unwrap();
    let symbols: Vec<&str> = tracked.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["MSFT:NASDAQ", "AAPL:NASDAQ"]);
    assert!(tracked[0].id < tracked[1].id);
}

#[tokio::test]
async fn test_record_price_updates_latest_and_history() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);
    let finance = repo.create("AAPL:NASDAQ", true).await.unwrap();
    let fetched_at = Utc::now() - Duration::minutes(5);

    let record = repo
        .record_price(finance.id, dec!(150.25), fetched_at)
        .await
        .unwrap();
    assert_eq!(record.finance_id, finance.id);
    assert_eq!(record.current_price, dec!(150.25));

    let stored = repo.find_by_symbol("AAPL:NASDAQ").await.unwrap().unwrap();
    assert_eq!(stored.last_closing_price, Some(dec!(150.25)));
    assert!(stored.updated_at >= finance.updated_at);

    let history = repo
        .find_history(finance.id, fetched_at - Duration::hours(1), Utc::now())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].current_price, dec!(150.25));
}

#[tokio::test]
async fn test_record_price_for_missing_finance() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);

    let err = repo
        .record_price(999, dec!(1.00), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

/// 历史查询区间两端均为开区间
#[tokio::test]
async fn test_find_history_uses_open_interval() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);
    let finance = repo.create("GOOGL:NASDAQ", true).await.unwrap();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    for (minutes, price) in [(1, dec!(10)), (2, dec!(20)), (3, dec!(30))] {
        repo.record_price(finance.id, price, base + Duration::minutes(minutes))
            .await
            .unwrap();
    }

    let history = repo
        .find_history(
            finance.id,
            base + Duration::minutes(1),
            base + Duration::minutes(3),
        )
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].current_price, dec!(20));

    let all = repo
        .find_history(finance.id, base, base + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_create_duplicate_symbol() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);
    repo.create("AAPL:NASDAQ", false).await.unwrap();

    let err = repo.create("AAPL:NASDAQ", true).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists));
}

#[tokio::test]
async fn test_update_partial_fields() {
    let repo = FinanceRepositoryImpl::new(create_test_db().await);
    repo.create("AAPL:NASDAQ", false).await.unwrap();

    let updated = repo
        .update(
            "AAPL:NASDAQ",
            FinanceUpdate {
                is_tracking: Some(true),
                daily_change_percentage: Some(1.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_tracking);
    assert_eq!(updated.daily_change_percentage, Some(1.5));
    assert_eq!(updated.last_closing_price, None);

    let err = repo
        .update("NOPE", FinanceUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

/// 删除标的时一并删除其价格历史
#[tokio::test]
async fn test_delete_removes_history() {
    let db = create_test_db().await;
    let repo = FinanceRepositoryImpl::new(db.clone());
    let finance = repo.create("AAPL:NASDAQ", true).await.unwrap();
    repo.record_price(finance.id, dec!(1), Utc::now())
        .await
        .unwrap();
    repo.record_price(finance.id, dec!(2), Utc::now())
        .await
        .unwrap();

    repo.delete("AAPL:NASDAQ").await.unwrap();

    assert!(repo.find_by_symbol("AAPL:NASDAQ").await.unwrap().is_none());
    let remaining = finance_history::Entity::find()
        .count(db.as_ref())
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let err = repo.delete("AAPL:NASDAQ").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
