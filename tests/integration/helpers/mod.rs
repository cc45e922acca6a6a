// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::Extension;
use axum_test::TestServer;
use fincrawl::config::settings::{CrawlerSettings, DatabaseSettings};
use fincrawl::domain::services::crawl_orchestrator::CrawlOrchestrator;
use fincrawl::domain::services::single_flight_gate::SingleFlightGate;
use fincrawl::engines::fetch_client::FetchClient;
use fincrawl::engines::traits::{PageFetchError, PageFetcher};
use fincrawl::infrastructure::database::connection;
use fincrawl::infrastructure::repositories::finance_repo_impl::FinanceRepositoryImpl;
use fincrawl::presentation::routes;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub repository: Arc<FinanceRepositoryImpl>,
    pub orchestrator: Arc<CrawlOrchestrator<FinanceRepositoryImpl>>,
}

/// 创建已完成迁移的内存 SQLite 数据库
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    let db = connection::create_pool(&settings)
        .await
        .expect("Failed to open in-memory database");
    connection::run_migrations(&db)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

/// 测试用的快速抓取配置
pub fn fast_crawler_settings() -> CrawlerSettings {
    CrawlerSettings {
        worker_count: 1,
        poll_interval_ms: 10,
        max_attempts: 3,
        retry_delay_ms: 1,
        attempt_timeout_secs: 5,
        drain_timeout_secs: 10,
        join_timeout_secs: 5,
        ..CrawlerSettings::default()
    }
}

pub fn build_orchestrator(
    repository: Arc<FinanceRepositoryImpl>,
    fetcher: Arc<dyn PageFetcher>,
) -> Arc<CrawlOrchestrator<FinanceRepositoryImpl>> {
    let settings = fast_crawler_settings();
    let client = FetchClient::from_settings(fetcher, &settings);
    Arc::new(CrawlOrchestrator::new(
        repository,
        Arc::new(client),
        SingleFlightGate::new(),
        settings,
    ))
}

pub async fn create_test_app(fetcher: Arc<dyn PageFetcher>) -> TestApp {
    let db = create_test_db().await;
    let repository = Arc::new(FinanceRepositoryImpl::new(db.clone()));
    let orchestrator = build_orchestrator(repository.clone(), fetcher);

    let app = routes::routes::<FinanceRepositoryImpl>()
        .layer(Extension(repository.clone()))
        .layer(Extension(orchestrator.clone()));

    TestApp {
        server: TestServer::new(app).expect("Failed to start test server"),
        db,
        repository,
        orchestrator,
    }
}

/// 按标的返回固定结果的抓取器，未配置的标的返回 `NotFound`
pub struct StubFetcher {
    quotes: HashMap<String, Result<String, PageFetchError>>,
    delay: Duration,
}

#[allow(dead_code)]
impl StubFetcher {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn quote(mut self, symbol: &str, text: &str) -> Self {
        self.quotes.insert(symbol.to_string(), Ok(text.to_string()));
        self
    }

    pub fn failing(mut self, symbol: &str, error: PageFetchError) -> Self {
        self.quotes.insert(symbol.to_string(), Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn shared(self) -> Arc<dyn PageFetcher> {
        Arc::new(self)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_price(&self, symbol: &str) -> Result<String, PageFetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.quotes
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(PageFetchError::NotFound(symbol.to_string())))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
