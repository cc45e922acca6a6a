// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::fetch_client::FetchClient;
use crate::queue::crawl_queue::{CrawlQueue, PopResult};
use crate::queue::result_sink::ResultSink;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 抓取工作器
///
/// 从队列取出请求，调用抓取客户端，把结果写入收集器后确认请求。
/// 队列关闭且为空时退出；被取消时只完成手上正在处理的请求。
pub struct CrawlWorker {
    name: String,
    queue: Arc<CrawlQueue>,
    client: Arc<FetchClient>,
    sink: Arc<ResultSink>,
    poll_interval: Duration,
}

impl CrawlWorker {
    pub fn new(
        id: usize,
        queue: Arc<CrawlQueue>,
        client: Arc<FetchClient>,
        sink: Arc<ResultSink>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name: format!("crawl-worker-{}", id),
            queue,
            client,
            sink,
            poll_interval,
        }
    }
}

#[async_trait]
impl Worker for CrawlWorker {
    async fn run(&self) {
        info!("{} started", self.name);
        let mut processed = 0usize;

        loop {
            match self.queue.pop_or_wait(self.poll_interval).await {
                PopResult::Item(lease) => {
                    let outcome = self.client.fetch(&lease.request().symbol).await;
                    self.sink.add(outcome);
                    lease.ack();
                    processed += 1;
                }
                PopResult::TimedOut => debug!("{} idle, polling again", self.name),
                PopResult::Closed => break,
            }
        }

        info!(processed, "{} stopped", self.name);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
