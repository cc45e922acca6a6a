// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Extension;
use fincrawl::config::settings::Settings;
use fincrawl::domain::services::crawl_orchestrator::CrawlOrchestrator;
use fincrawl::domain::services::single_flight_gate::SingleFlightGate;
use fincrawl::engines::build_fetcher;
use fincrawl::engines::fetch_client::FetchClient;
use fincrawl::infrastructure::database::connection;
use fincrawl::infrastructure::repositories::finance_repo_impl::FinanceRepositoryImpl;
use fincrawl::presentation::routes;
use fincrawl::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging, the guard flushes the crawl log on exit
    let _crawl_log_guard = telemetry::init_telemetry(&settings.logging)?;
    info!("Starting fincrawl...");
    if let Some(dir) = settings.logging.crawl_log_dir() {
        info!("Writing crawl log to {}", dir);
    }

    // Initialize Prometheus Metrics
    fincrawl::infrastructure::metrics::init_metrics(&settings.metrics)?;

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");
    connection::run_migrations(db.as_ref()).await?;

    // 4. Initialize components
    let repository = Arc::new(FinanceRepositoryImpl::new(db.clone()));
    let fetcher = build_fetcher(&settings.fetcher)?;
    let fetch_client = Arc::new(FetchClient::from_settings(fetcher, &settings.crawler));
    let orchestrator = Arc::new(CrawlOrchestrator::new(
        repository.clone(),
        fetch_client,
        SingleFlightGate::new(),
        settings.crawler.clone(),
    ));

    // 5. Start HTTP server
    let app = routes::routes::<FinanceRepositoryImpl>()
        .layer(Extension(repository))
        .layer(Extension(orchestrator.clone()));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the in-flight fetch finish, the rest of the batch is cancelled.
    // A run still populating cancels its own queue once it sees the stop flag.
    orchestrator.shutdown();
    if orchestrator.is_running() {
        let grace = settings.crawler.attempt_timeout() + settings.crawler.join_timeout();
        if !orchestrator.wait_idle(grace).await {
            warn!("Crawl run still active after {:?}, exiting anyway", grace);
        }
    }

    info!("fincrawl stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            warn!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
