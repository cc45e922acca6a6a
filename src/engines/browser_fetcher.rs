// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetcherSettings;
use crate::engines::traits::{quote_url, PageFetchError, PageFetcher};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 浏览器会话
///
/// 每次尝试独占一个会话，用完后必须调用 `close`
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 本地启动的浏览器需要关闭进程，远程连接只断开
    owned: bool,
}

impl BrowserSession {
    async fn close(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            let _ = self.browser.wait().await;
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// 浏览器页面抓取器
///
/// 基于chromiumoxide驱动无头Chromium，等待价格元素渲染后读取其文本
pub struct BrowserPageFetcher {
    base_url: String,
    selector: String,
    wait_timeout: Duration,
    remote_debugging_url: Option<String>,
    user_agent: Option<String>,
}

impl BrowserPageFetcher {
    pub fn new(settings: &FetcherSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            selector: settings.price_selector.clone(),
            wait_timeout: settings.wait_timeout(),
            remote_debugging_url: settings.remote_debugging_url.clone(),
            user_agent: settings.user_agent.clone(),
        }
    }

    async fn open_session(&self) -> Result<BrowserSession, PageFetchError> {
        let ((browser, mut handler), owned) = if let Some(ref url) = self.remote_debugging_url {
            debug!("Connecting to remote Chrome instance at: {}", url);
            let pair = Browser::connect(url).await.map_err(|e| {
                PageFetchError::Unexpected(format!("Failed to connect to remote Chrome: {}", e))
            })?;
            (pair, false)
        } else {
            let config = BrowserConfig::builder()
                .no_sandbox()
                .arg("--headless")
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .build()
                .map_err(PageFetchError::Unexpected)?;
            let pair = Browser::launch(config).await.map_err(|e| {
                PageFetchError::Unexpected(format!("Failed to launch browser: {}", e))
            })?;
            (pair, true)
        };

        // Spawn a handler to process browser events
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(BrowserSession {
            browser,
            handler,
            owned,
        })
    }

    async fn wait_for_price(&self, page: &Page) -> Result<String, PageFetchError> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            match page.find_element(self.selector.as_str()).await {
                Ok(element) => {
                    let text = element
                        .inner_text()
                        .await
                        .map_err(|e| PageFetchError::Unexpected(e.to_string()))?
                        .unwrap_or_default();
                    let text = text.trim();
                    if text.is_empty() {
                        return Err(PageFetchError::NotFound(
                            "price element is empty".to_string(),
                        ));
                    }
                    return Ok(text.to_string());
                }
                Err(_) if Instant::now() >= deadline => {
                    return Err(PageFetchError::Timeout(format!(
                        "'{}' did not appear within {:?}",
                        self.selector, self.wait_timeout
                    )));
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn read_price(&self, browser: &Browser, symbol: &str) -> Result<String, PageFetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PageFetchError::Unexpected(e.to_string()))?;

        let result = async {
            if let Some(ref ua) = self.user_agent {
                page.set_user_agent(ua.as_str())
                    .await
                    .map_err(|e| PageFetchError::Unexpected(e.to_string()))?;
            }
            page.goto(quote_url(&self.base_url, symbol))
                .await
                .map_err(|e| PageFetchError::Unexpected(format!("Navigation failed: {}", e)))?;
            self.wait_for_price(&page).await
        }
        .await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        result
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch_price(&self, symbol: &str) -> Result<String, PageFetchError> {
        let session = self.open_session().await?;
        let result = self.read_price(&session.browser, symbol).await;
        session.close().await;
        result
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
