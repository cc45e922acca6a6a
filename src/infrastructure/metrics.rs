// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 启动Prometheus导出器并注册抓取相关的指标
///
/// # 参数
///
/// * `settings` - 指标配置
///
/// # 返回值
///
/// * `Ok(())` - 初始化完成或指标被禁用
/// * `Err(anyhow::Error)` - 监听地址无效
pub fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = settings
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address '{}'", settings.listen_addr))?;

    // Keep serving when the port is taken, metrics are not critical
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return Ok(());
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "fincrawl_fetch_attempts_total",
        "Total number of page fetch attempts"
    );
    describe_counter!(
        "fincrawl_fetch_outcomes_total",
        "Total number of per-symbol fetch outcomes by result"
    );
    describe_histogram!(
        "fincrawl_fetch_duration_seconds",
        "Time spent fetching one symbol including retries"
    );
    describe_counter!(
        "fincrawl_crawl_runs_total",
        "Total number of crawl runs by final status"
    );
    describe_counter!(
        "fincrawl_price_records_total",
        "Total number of price records written"
    );
    describe_gauge!(
        "fincrawl_crawl_running",
        "Whether a crawl run is in progress (0 or 1)"
    );
}
