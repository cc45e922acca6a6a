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

use crate::domain::models::crawl::FetchErrorKind;
use async_trait::async_trait;
use thiserror::Error;

/// 页面抓取错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageFetchError {
    /// 等待价格元素超时
    #[error("Timed out waiting for price content: {0}")]
    Timeout(String),
    /// 页面中没有价格内容
    #[error("Price content not found: {0}")]
    NotFound(String),
    /// 其他错误
    #[error("Unexpected fetch error: {0}")]
    Unexpected(String),
}

impl PageFetchError {
    /// 对应的失败类型，用于查询重试决策表
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            PageFetchError::Timeout(_) => FetchErrorKind::Timeout,
            PageFetchError::NotFound(_) => FetchErrorKind::NotFound,
            PageFetchError::Unexpected(_) => FetchErrorKind::Unexpected,
        }
    }
}

/// 抓取器构建错误
#[derive(Error, Debug)]
pub enum FetcherBuildError {
    /// 价格选择器无法解析
    #[error("Invalid price selector '{0}'")]
    InvalidSelector(String),
    /// HTTP 客户端构建失败
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<reqwest::Error> for PageFetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            PageFetchError::Timeout(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
            PageFetchError::NotFound(e.to_string())
        } else {
            PageFetchError::Unexpected(e.to_string())
        }
    }
}

/// 页面抓取器 trait
///
/// 负责取回某个标的报价页面上的原始价格文本，不做解析
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取价格文本
    ///
    /// # 参数
    ///
    /// * `symbol` - 标的代码
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 价格元素的原始文本
    /// * `Err(PageFetchError)` - 抓取失败
    async fn fetch_price(&self, symbol: &str) -> Result<String, PageFetchError>;

    /// 获取抓取器名称
    fn name(&self) -> &'static str;
}

/// 拼接标的报价页面地址
pub(crate) fn quote_url(base_url: &str, symbol: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), symbol)
}
