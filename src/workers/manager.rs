// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::fetch_client::FetchClient;
use crate::queue::crawl_queue::CrawlQueue;
use crate::queue::result_sink::ResultSink;
use crate::workers::crawl_worker::CrawlWorker;
use crate::workers::worker::Worker;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 负责一次抓取运行内所有工作器的启动和回收
pub struct WorkerManager {
    queue: Arc<CrawlQueue>,
    client: Arc<FetchClient>,
    sink: Arc<ResultSink>,
    poll_interval: Duration,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<CrawlQueue>,
        client: Arc<FetchClient>,
        sink: Arc<ResultSink>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            client,
            sink,
            poll_interval,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程，它们共享同一个队列和结果收集器
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for id in 0..count {
            let worker = CrawlWorker::new(
                id,
                self.queue.clone(),
                self.client.clone(),
                self.sink.clone(),
                self.poll_interval,
            );
            let handle = tokio::spawn(async move {
                worker.run().await;
            });
            self.handles.push(handle);
        }
        info!("Started {} crawl worker(s)", count);
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 等待所有工作进程退出
    ///
    /// 不会强制终止工作进程，超时后它们继续在后台运行直到当前请求结束
    ///
    /// # 返回值
    ///
    /// 所有工作进程在 `timeout` 内退出返回 `true`
    pub async fn join(&mut self, timeout: Duration) -> bool {
        let handles = std::mem::take(&mut self.handles);
        match tokio::time::timeout(timeout, join_all(handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!("Crawl worker terminated abnormally: {}", e);
                    }
                }
                true
            }
            Err(_) => false,
        }
    }
}
