// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl::{CrawlPhase, CrawlRunState};
use chrono::Utc;
use metrics::gauge;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

/// 单飞门
///
/// 保证进程内同一时刻最多只有一个抓取运行。
/// 第二个调用方会被直接拒绝，而不是排队等待。
/// 克隆出的实例共享同一个状态。
#[derive(Debug, Clone, Default)]
pub struct SingleFlightGate {
    state: Arc<Mutex<CrawlRunState>>,
    idle: Arc<Notify>,
}

impl SingleFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试从 Idle 转换为 Running
    ///
    /// # 返回值
    ///
    /// * `Some(RunPermit)` - 获取成功，许可被丢弃时自动释放
    /// * `None` - 已有运行在进行中
    pub fn try_acquire(&self) -> Option<RunPermit> {
        let mut state = self.state.lock();
        if state.is_running() {
            return None;
        }

        let run_id = Uuid::new_v4();
        *state = CrawlRunState::Running {
            run_id,
            started_at: Utc::now(),
            phase: CrawlPhase::Acquiring,
        };
        gauge!("fincrawl_crawl_running").set(1.0);

        Some(RunPermit {
            gate: self.clone(),
            run_id,
            released: false,
        })
    }

    /// 释放指定运行，重复调用或运行ID不匹配时不做任何事
    ///
    /// # 返回值
    ///
    /// 本次调用是否完成了 Running → Idle 的转换
    pub fn release(&self, run_id: Uuid) -> bool {
        let mut state = self.state.lock();
        if state.run_id() != Some(run_id) {
            return false;
        }
        *state = CrawlRunState::Idle;
        gauge!("fincrawl_crawl_running").set(0.0);
        self.idle.notify_waiters();
        true
    }

    /// 等待回到 Idle
    ///
    /// # 返回值
    ///
    /// 在 `timeout` 内回到 Idle 返回 `true`
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.idle.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if !self.is_running() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_running()
    }

    /// 当前状态的拷贝
    pub fn state(&self) -> CrawlRunState {
        *self.state.lock()
    }

    fn set_phase(&self, run_id: Uuid, next: CrawlPhase) {
        let mut state = self.state.lock();
        if let CrawlRunState::Running {
            run_id: current,
            phase,
            ..
        } = &mut *state
        {
            if *current == run_id {
                *phase = next;
            }
        }
    }
}

/// 运行许可
///
/// 持有期间门处于 Running 状态；无论运行如何结束（包括 panic），丢弃时都会释放
#[derive(Debug)]
pub struct RunPermit {
    gate: SingleFlightGate,
    run_id: Uuid,
    released: bool,
}

impl RunPermit {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 推进运行阶段
    pub fn advance(&self, phase: CrawlPhase) {
        self.gate.set_phase(self.run_id, phase);
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.gate.release(self.run_id);
        }
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.release_inner();
    }
}
