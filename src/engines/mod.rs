// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod browser_fetcher;
pub mod fetch_client;
pub mod http_fetcher;
pub mod traits;

use crate::config::settings::{FetcherEngine, FetcherSettings};
use std::sync::Arc;
use traits::{FetcherBuildError, PageFetcher};

/// 按配置创建页面抓取器
///
/// # 参数
///
/// * `settings` - 抓取器配置
///
/// # 返回值
///
/// * `Ok(Arc<dyn PageFetcher>)` - 配置选择的抓取器
/// * `Err(FetcherBuildError)` - 抓取器构建失败
pub fn build_fetcher(settings: &FetcherSettings) -> Result<Arc<dyn PageFetcher>, FetcherBuildError> {
    let fetcher: Arc<dyn PageFetcher> = match settings.engine {
        FetcherEngine::Browser => Arc::new(browser_fetcher::BrowserPageFetcher::new(settings)),
        FetcherEngine::Http => Arc::new(http_fetcher::HttpPageFetcher::new(settings)?),
    };
    tracing::info!("Using {} page fetcher", fetcher.name());
    Ok(fetcher)
}
