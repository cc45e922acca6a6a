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

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库、抓取编排、页面抓取器和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 抓取编排配置
    pub crawler: CrawlerSettings,
    /// 页面抓取器配置
    pub fetcher: FetcherSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 抓取编排配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 工作器数量
    pub worker_count: usize,
    /// 工作器轮询队列的超时时间（毫秒）
    pub poll_interval_ms: u64,
    /// 每个标的的最大尝试次数
    pub max_attempts: u32,
    /// 重试间隔（毫秒），指数退避时为首次间隔
    pub retry_delay_ms: u64,
    /// 退避乘数，1.0 为固定间隔
    pub backoff_multiplier: f64,
    /// 退避间隔上限（毫秒），缺省时等于 `retry_delay_ms`
    pub max_retry_delay_ms: Option<u64>,
    /// 是否对退避间隔加入 ±10% 抖动
    pub retry_jitter: bool,
    /// 单次尝试的硬性超时（秒）
    pub attempt_timeout_secs: u64,
    /// 等待队列排空的总超时（秒）
    pub drain_timeout_secs: u64,
    /// 停止信号后等待工作器退出的时间窗口（秒）
    pub join_timeout_secs: u64,
}

impl CrawlerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms.unwrap_or(self.retry_delay_ms))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            worker_count: 1,
            poll_interval_ms: 1000,
            max_attempts: 3,
            retry_delay_ms: 1000,
            backoff_multiplier: 1.0,
            max_retry_delay_ms: None,
            retry_jitter: false,
            attempt_timeout_secs: 30,
            drain_timeout_secs: 600,
            join_timeout_secs: 5,
        }
    }
}

/// 页面抓取引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherEngine {
    /// 无头浏览器（chromiumoxide）
    Browser,
    /// 纯HTTP请求 + HTML选择器
    Http,
}

/// 页面抓取器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherSettings {
    /// 抓取引擎
    pub engine: FetcherEngine,
    /// 报价页面基础URL，标的代码追加在末尾
    pub base_url: String,
    /// 价格元素的CSS选择器
    pub price_selector: String,
    /// 等待价格元素出现的超时（秒）
    pub wait_timeout_secs: u64,
    /// 远程 Chrome 调试地址（可选）
    pub remote_debugging_url: Option<String>,
    /// 自定义 User-Agent（可选）
    pub user_agent: Option<String>,
}

impl FetcherSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 抓取日志目录，按天滚动写入 JSON 日志；为空时不写文件
    pub crawl_log_dir: Option<String>,
}

impl LoggingSettings {
    pub fn crawl_log_dir(&self) -> Option<&str> {
        self.crawl_log_dir.as_deref().filter(|dir| !dir.trim().is_empty())
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和 `FINCRAWL__*` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并校验的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("FINCRAWL").separator("__"));

        Self::from_builder(builder)
    }

    /// 带默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://fincrawl.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("crawler.worker_count", 1)?
            .set_default("crawler.poll_interval_ms", 1000)?
            .set_default("crawler.max_attempts", 3)?
            .set_default("crawler.retry_delay_ms", 1000)?
            .set_default("crawler.backoff_multiplier", 1.0)?
            .set_default("crawler.retry_jitter", false)?
            .set_default("crawler.attempt_timeout_secs", 30)?
            .set_default("crawler.drain_timeout_secs", 600)?
            .set_default("crawler.join_timeout_secs", 5)?
            .set_default("fetcher.engine", "browser")?
            .set_default("fetcher.base_url", "https://www.google.com/finance/quote")?
            .set_default("fetcher.price_selector", ".YMlKec.fxKbKc")?
            .set_default("fetcher.wait_timeout_secs", 5)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("logging.crawl_log_dir", "crawl/finance")
    }

    /// 从构建器生成并校验配置
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "server.port must be an integer between 1 and 65535".to_string(),
            ));
        }
        if self.crawler.worker_count == 0 {
            return Err(ConfigError::Message(
                "crawler.worker_count must be at least 1".to_string(),
            ));
        }
        if self.crawler.max_attempts == 0 {
            return Err(ConfigError::Message(
                "crawler.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.crawler.backoff_multiplier.is_nan() || self.crawler.backoff_multiplier < 1.0 {
            return Err(ConfigError::Message(
                "crawler.backoff_multiplier must be at least 1.0".to_string(),
            ));
        }
        if self.crawler.max_retry_delay() < self.crawler.retry_delay() {
            return Err(ConfigError::Message(
                "crawler.max_retry_delay_ms must not be less than crawler.retry_delay_ms".to_string(),
            ));
        }
        if self.crawler.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "crawler.poll_interval_ms must be positive".to_string(),
            ));
        }
        url::Url::parse(&self.fetcher.base_url).map_err(|e| {
            ConfigError::Message(format!("fetcher.base_url is not a valid URL: {}", e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
