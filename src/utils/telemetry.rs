// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LoggingSettings;
use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,fincrawl=debug";

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to open crawl log: {0}")]
    CrawlLog(#[from] InitError),
    #[error("Failed to install subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// 写入抓取日志文件的事件来源：抓取器、工作器和编排器
pub fn crawl_log_targets() -> Targets {
    Targets::new()
        .with_target("fincrawl::engines", Level::INFO)
        .with_target("fincrawl::workers", Level::INFO)
        .with_target("fincrawl::domain::services::crawl_orchestrator", Level::INFO)
}

/// 在 `dir` 下创建按天滚动的 `crawl.<date>.log`
fn crawl_log_writer(dir: &str) -> Result<(NonBlocking, WorkerGuard), InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("crawl")
        .filename_suffix("log")
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// 初始化日志
///
/// 过滤规则取自 `RUST_LOG`，默认 `info,fincrawl=debug`。
/// `LOG_FORMAT=json` 时标准输出使用结构化JSON。
/// 配置了抓取日志目录时，抓取相关事件另外以JSON写入按天滚动的文件，
/// 每条记录带有所在 span 的 `symbol` 和 `run_id`。
///
/// # 参数
///
/// * `settings` - 日志配置
///
/// # 返回值
///
/// * `Ok(Some(WorkerGuard))` - 文件日志已启用，guard 需保持到进程退出
/// * `Ok(None)` - 未启用文件日志
/// * `Err(TelemetryError)` - 目录无法创建或已经设置过全局订阅者
pub fn init_telemetry(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (crawl_writer, guard) = match settings.crawl_log_dir() {
        Some(dir) => {
            let (writer, guard) = crawl_log_writer(dir)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let crawl_layer = crawl_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_current_span(true)
            .with_writer(writer)
            .with_filter(crawl_log_targets())
    });

    let registry = tracing_subscriber::registry().with(filter).with(crawl_layer);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(guard)
}
