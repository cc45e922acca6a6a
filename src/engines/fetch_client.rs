// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlerSettings;
use crate::domain::models::crawl::FetchOutcome;
use crate::engines::traits::{PageFetchError, PageFetcher};
use crate::utils::price_parser::parse_price;
use crate::utils::retry_policy::RetryPolicy;
use futures::FutureExt;
use metrics::{counter, histogram};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// 抓取客户端
///
/// 在页面抓取器之上实现单个标的的完整抓取流程：
/// 每次尝试都有硬性超时，价格文本被解析为十进制数，失败按重试决策表处理。
/// 无论成功与否都返回 `FetchOutcome`，不会向调用方传播错误。
pub struct FetchClient {
    fetcher: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl FetchClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            fetcher,
            policy,
            attempt_timeout,
        }
    }

    /// 按抓取编排配置创建客户端
    ///
    /// 默认配置为固定间隔重试，配置了乘数和上限时按指数退避
    pub fn from_settings(fetcher: Arc<dyn PageFetcher>, settings: &CrawlerSettings) -> Self {
        let policy = RetryPolicy {
            backoff_multiplier: settings.backoff_multiplier,
            max_backoff: settings.max_retry_delay(),
            enable_jitter: settings.retry_jitter,
            ..RetryPolicy::fixed(settings.max_attempts, settings.retry_delay())
        };
        Self::new(fetcher, policy, settings.attempt_timeout())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 抓取单个标的的价格
    ///
    /// # 参数
    ///
    /// * `symbol` - 标的代码
    ///
    /// # 返回值
    ///
    /// 抓取结果，失败时 `succeeded=false` 并带有失败类型
    #[instrument(skip(self), fields(fetcher = self.fetcher.name()))]
    pub async fn fetch(&self, symbol: &str) -> FetchOutcome {
        let start = Instant::now();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            counter!("fincrawl_fetch_attempts_total").increment(1);

            match self.attempt(symbol).await {
                Ok(price) => break FetchOutcome::success(symbol, price, attempt),
                Err(e) => {
                    let kind = e.kind();
                    if self.policy.should_retry(attempt, kind) {
                        let backoff = self.policy.calculate_backoff(attempt);
                        warn!(attempt, "Fetch attempt failed, retrying in {:?}: {}", backoff, e);
                        tokio::time::sleep(backoff).await;
                    } else {
                        error!(attempt, "Fetch failed: {}", e);
                        break FetchOutcome::failure(symbol, kind, attempt);
                    }
                }
            }
        };

        histogram!("fincrawl_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
        let result = if outcome.succeeded { "success" } else { "failure" };
        counter!("fincrawl_fetch_outcomes_total", "result" => result).increment(1);

        outcome
    }

    async fn attempt(&self, symbol: &str) -> Result<rust_decimal::Decimal, PageFetchError> {
        let fetch = AssertUnwindSafe(self.fetcher.fetch_price(symbol)).catch_unwind();

        let text = match tokio::time::timeout(self.attempt_timeout, fetch).await {
            Ok(Ok(result)) => result?,
            Ok(Err(_)) => {
                return Err(PageFetchError::Unexpected(
                    "page fetcher panicked".to_string(),
                ))
            }
            Err(_) => {
                return Err(PageFetchError::Timeout(format!(
                    "attempt exceeded {:?}",
                    self.attempt_timeout
                )))
            }
        };

        parse_price(&text).map_err(|e| PageFetchError::Unexpected(e.to_string()))
    }
}

#[cfg(test)]
#[path = "fetch_client_test.rs"]
mod tests;
