// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl::CrawlRequest;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

/// 队列错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// 队列已关闭，不再接受新请求
    #[error("Queue is closed for new input")]
    Closed,
}

/// 出队结果
#[derive(Debug)]
pub enum PopResult {
    /// 取到一个请求，处理完后需要确认
    Item(CrawlLease),
    /// 等待超时，队列暂时为空
    TimedOut,
    /// 队列已关闭且为空，工作器应退出
    Closed,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<CrawlRequest>,
    closed: bool,
    in_flight: usize,
}

impl QueueState {
    fn is_drained(&self) -> bool {
        self.closed && self.items.is_empty() && self.in_flight == 0
    }
}

/// 抓取请求队列
///
/// 先进先出，可被多个工作器并发消费。
/// 只有在队列关闭、为空且所有已出队请求都被确认后才视为排空，
/// 避免最后一个请求仍在处理时误判完成。
#[derive(Debug, Default)]
pub struct CrawlQueue {
    state: Mutex<QueueState>,
    item_ready: Notify,
    drained: Notify,
}

impl CrawlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入队请求
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 入队成功
    /// * `Err(QueueError::Closed)` - 队列已关闭
    pub fn push(&self, request: CrawlRequest) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(QueueError::Closed);
        }
        state.items.push_back(request);
        drop(state);

        self.item_ready.notify_one();
        Ok(())
    }

    /// 出队请求，最多等待 `timeout`
    ///
    /// # 参数
    ///
    /// * `timeout` - 队列为空时的最长等待时间
    ///
    /// # 返回值
    ///
    /// 取到的请求租约、超时或关闭
    pub async fn pop_or_wait(self: &Arc<Self>, timeout: Duration) -> PopResult {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            // Register before checking state so a push in between is not missed
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(request) = state.items.pop_front() {
                    state.in_flight += 1;
                    return PopResult::Item(CrawlLease {
                        queue: Arc::clone(self),
                        request,
                        acked: false,
                    });
                }
                if state.closed {
                    return PopResult::Closed;
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return PopResult::TimedOut;
            }
        }
    }

    /// 关闭队列，不再接受新请求；已入队的请求仍可被消费
    pub fn close(&self) {
        let drained = {
            let mut state = self.state.lock();
            state.closed = true;
            state.is_drained()
        };
        self.item_ready.notify_waiters();
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// 取消队列：关闭并丢弃所有尚未出队的请求
    ///
    /// 正在处理中的请求不受影响
    ///
    /// # 返回值
    ///
    /// 被丢弃的请求
    pub fn cancel(&self) -> Vec<CrawlRequest> {
        let (discarded, drained) = {
            let mut state = self.state.lock();
            state.closed = true;
            let discarded: Vec<CrawlRequest> = state.items.drain(..).collect();
            (discarded, state.is_drained())
        };
        self.item_ready.notify_waiters();
        if drained {
            self.drained.notify_waiters();
        }
        discarded
    }

    /// 等待队列排空
    ///
    /// # 返回值
    ///
    /// 在 `timeout` 内排空返回 `true`，否则返回 `false`
    pub async fn wait_drained(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.drained.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.is_drained() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    pub fn is_drained(&self) -> bool {
        self.state.lock().is_drained()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// 已出队但尚未确认的请求数
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    fn complete_one(&self) {
        let drained = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.is_drained()
        };
        if drained {
            self.drained.notify_waiters();
        }
    }
}

/// 已出队请求的租约
///
/// 调用 `ack` 或被丢弃时向队列确认完成
#[derive(Debug)]
pub struct CrawlLease {
    queue: Arc<CrawlQueue>,
    request: CrawlRequest,
    acked: bool,
}

impl CrawlLease {
    pub fn request(&self) -> &CrawlRequest {
        &self.request
    }

    /// 确认请求已处理完成
    pub fn ack(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.acked {
            self.acked = true;
            self.queue.complete_one();
        }
    }
}

impl Drop for CrawlLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "crawl_queue_test.rs"]
mod tests;
