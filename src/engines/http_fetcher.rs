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

use crate::config::settings::FetcherSettings;
use crate::engines::traits::{quote_url, FetcherBuildError, PageFetchError, PageFetcher};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; fincrawl/0.1)";

/// HTTP 页面抓取器
///
/// 基于reqwest请求报价页面，再用CSS选择器从HTML中取出价格文本。
/// 适用于价格直接渲染在服务端HTML中的数据源。
pub struct HttpPageFetcher {
    client: reqwest::Client,
    base_url: String,
    selector: Selector,
}

impl HttpPageFetcher {
    /// 创建新的HTTP抓取器
    ///
    /// # 参数
    ///
    /// * `settings` - 抓取器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(HttpPageFetcher)` - 抓取器实例
    /// * `Err(FetcherBuildError)` - 选择器无效或客户端构建失败
    pub fn new(settings: &FetcherSettings) -> Result<Self, FetcherBuildError> {
        let selector = Selector::parse(&settings.price_selector)
            .map_err(|_| FetcherBuildError::InvalidSelector(settings.price_selector.clone()))?;

        let client = reqwest::Client::builder()
            .user_agent(
                settings
                    .user_agent
                    .as_deref()
                    .unwrap_or(DEFAULT_USER_AGENT),
            )
            .timeout(settings.wait_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            selector,
        })
    }

    fn extract(&self, body: &str) -> Result<String, PageFetchError> {
        let document = Html::parse_document(body);
        let element = document
            .select(&self.selector)
            .next()
            .ok_or_else(|| PageFetchError::NotFound("price element missing".to_string()))?;

        let text = element.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            return Err(PageFetchError::NotFound("price element is empty".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_price(&self, symbol: &str) -> Result<String, PageFetchError> {
        let url = quote_url(&self.base_url, symbol);
        debug!("Requesting {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PageFetchError::NotFound(format!("{} returned 404", url)));
        }
        if !status.is_success() {
            return Err(PageFetchError::Unexpected(format!(
                "{} returned {}",
                url, status
            )));
        }

        let body = response.text().await?;
        self.extract(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
