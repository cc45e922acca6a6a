// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlerSettings;
use crate::domain::models::crawl::{
    CrawlPhase, CrawlRequest, CrawlRunState, CrawlSummary, FetchErrorKind, FetchOutcome,
};
use crate::domain::models::finance::TrackedSymbol;
use crate::domain::repositories::price_repository::PriceRepository;
use crate::domain::services::single_flight_gate::{RunPermit, SingleFlightGate};
use crate::engines::fetch_client::FetchClient;
use crate::queue::crawl_queue::{CrawlQueue, QueueError};
use crate::queue::result_sink::ResultSink;
use crate::utils::errors::RepositoryError;
use crate::workers::manager::WorkerManager;
use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// 抓取运行错误类型
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 已有运行在进行中
    #[error("Request processor currently running.")]
    AlreadyRunning,
    /// 读取已跟踪标的失败
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 队列错误
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// 已在后台启动的运行
#[derive(Debug)]
pub struct TriggeredRun {
    pub run_id: Uuid,
    pub handle: JoinHandle<Result<CrawlSummary, CrawlError>>,
}

/// 状态探针返回的快照
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatus {
    pub running: bool,
    pub run_id: Option<Uuid>,
    pub phase: Option<CrawlPhase>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_summary: Option<CrawlSummary>,
}

/// 回写阶段的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub recorded: usize,
    pub unmatched: usize,
    pub persist_failed: usize,
}

/// 抓取编排器
///
/// 一次运行的完整流程：
/// 1. 通过单飞门获取运行许可
/// 2. 读取已跟踪标的，为每个标的入队一个请求并启动工作器
/// 3. 关闭队列并在超时范围内等待排空
/// 4. 把成功结果按标的代码回写到仓库
///
/// 单个标的的失败只会体现在汇总中，不会中断整批运行。
pub struct CrawlOrchestrator<R: PriceRepository> {
    repository: Arc<R>,
    fetch_client: Arc<FetchClient>,
    gate: SingleFlightGate,
    settings: CrawlerSettings,
    last_summary: Mutex<Option<CrawlSummary>>,
    active_queue: Mutex<Option<Arc<CrawlQueue>>>,
    stopping: AtomicBool,
}

impl<R: PriceRepository + 'static> CrawlOrchestrator<R> {
    pub fn new(
        repository: Arc<R>,
        fetch_client: Arc<FetchClient>,
        gate: SingleFlightGate,
        settings: CrawlerSettings,
    ) -> Self {
        Self {
            repository,
            fetch_client,
            gate,
            settings,
            last_summary: Mutex::new(None),
            active_queue: Mutex::new(None),
            stopping: AtomicBool::new(false),
        }
    }

    /// 在后台启动一次运行
    ///
    /// 获取许可后立即返回，运行本身在新的 tokio 任务中进行
    ///
    /// # 返回值
    ///
    /// * `Ok(TriggeredRun)` - 运行ID和后台任务句柄
    /// * `Err(CrawlError::AlreadyRunning)` - 已有运行在进行中
    pub fn trigger(self: &Arc<Self>) -> Result<TriggeredRun, CrawlError> {
        let permit = self.acquire()?;
        let run_id = permit.run_id();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.execute(permit).await });

        Ok(TriggeredRun { run_id, handle })
    }

    /// 在当前任务中同步完成一次运行
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let permit = self.acquire()?;
        self.execute(permit).await
    }

    fn acquire(&self) -> Result<RunPermit, CrawlError> {
        match self.gate.try_acquire() {
            Some(permit) => Ok(permit),
            None => {
                info!("Crawl run rejected, another run is in progress");
                counter!("fincrawl_crawl_runs_total", "status" => "rejected").increment(1);
                Err(CrawlError::AlreadyRunning)
            }
        }
    }

    async fn execute(&self, permit: RunPermit) -> Result<CrawlSummary, CrawlError> {
        let span = info_span!("crawl_run", run_id = %permit.run_id());
        let result = self.execute_phases(&permit).instrument(span).await;

        if result.is_err() {
            counter!("fincrawl_crawl_runs_total", "status" => "failed").increment(1);
        }
        self.active_queue.lock().take();
        permit.release();
        result
    }

    async fn execute_phases(&self, permit: &RunPermit) -> Result<CrawlSummary, CrawlError> {
        let started_at = Utc::now();

        permit.advance(CrawlPhase::Populating);
        let tracked = self.repository.list_tracked_symbols().await.map_err(|e| {
            error!("Failed to load tracked symbols: {}", e);
            e
        })?;

        let queue = Arc::new(CrawlQueue::new());
        let sink = Arc::new(ResultSink::new());
        let mut requested = Vec::with_capacity(tracked.len());
        for symbol in &tracked {
            queue.push(CrawlRequest::new(symbol.symbol.as_str()))?;
            requested.push(symbol.symbol.clone());
        }
        *self.active_queue.lock() = Some(queue.clone());
        if self.stopping.load(Ordering::SeqCst) {
            queue.cancel();
        }

        info!(symbols = requested.len(), "Crawl run started");
        let mut manager = WorkerManager::new(
            queue.clone(),
            self.fetch_client.clone(),
            sink.clone(),
            self.settings.poll_interval(),
        );
        manager.start_workers(self.settings.worker_count);

        permit.advance(CrawlPhase::Draining);
        queue.close();
        let mut degraded = false;
        if !queue.wait_drained(self.settings.drain_timeout()).await {
            let discarded = queue.cancel();
            warn!(
                discarded = discarded.len(),
                "Queue did not drain within {:?}, stopping workers",
                self.settings.drain_timeout()
            );
            degraded = true;
        }
        if !manager.join(self.settings.join_timeout()).await {
            warn!(
                "Crawl workers did not stop within {:?}, continuing with collected results",
                self.settings.join_timeout()
            );
            degraded = true;
        }

        permit.advance(CrawlPhase::Reconciling);
        let outcomes = Self::account_for_all(&requested, sink.snapshot());
        let by_symbol: HashMap<String, TrackedSymbol> = tracked
            .into_iter()
            .map(|t| (t.symbol.clone(), t))
            .collect();
        let report = self.reconcile(&by_symbol, &outcomes).await;

        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let summary = CrawlSummary {
            run_id: permit.run_id(),
            started: requested.len(),
            succeeded,
            failed: requested.len().saturating_sub(succeeded),
            recorded: report.recorded,
            unmatched: report.unmatched,
            persist_failed: report.persist_failed,
            degraded,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            started = summary.started,
            succeeded = summary.succeeded,
            failed = summary.failed,
            recorded = summary.recorded,
            unmatched = summary.unmatched,
            persist_failed = summary.persist_failed,
            degraded = summary.degraded,
            "Crawl run finished"
        );
        let status = if degraded { "degraded" } else { "completed" };
        counter!("fincrawl_crawl_runs_total", "status" => status).increment(1);
        *self.last_summary.lock() = Some(summary.clone());

        Ok(summary)
    }

    /// 为没有产生结果的请求补上 `Cancelled` 失败结果，保证 K 个请求对应 K 个结果
    fn account_for_all(requested: &[String], mut outcomes: Vec<FetchOutcome>) -> Vec<FetchOutcome> {
        let mut produced: HashMap<&str, usize> = HashMap::new();
        for outcome in &outcomes {
            *produced.entry(outcome.symbol.as_str()).or_default() += 1;
        }

        let mut missing = Vec::new();
        for symbol in requested {
            match produced.get_mut(symbol.as_str()) {
                Some(count) if *count > 0 => *count -= 1,
                _ => missing.push(symbol.clone()),
            }
        }

        for symbol in missing {
            warn!(symbol = %symbol, "No outcome produced, marking as cancelled");
            outcomes.push(FetchOutcome::failure(symbol, FetchErrorKind::Cancelled, 0));
        }
        outcomes
    }

    /// 把成功结果按标的代码回写到仓库
    ///
    /// 失败结果直接跳过；找不到对应标的的结果只记录警告；
    /// 写入失败按标的计数，不影响其余结果。
    ///
    /// # 参数
    ///
    /// * `tracked` - 运行开始时的标的快照，以代码为键（区分大小写）
    /// * `outcomes` - 本次运行的抓取结果
    pub async fn reconcile(
        &self,
        tracked: &HashMap<String, TrackedSymbol>,
        outcomes: &[FetchOutcome],
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for outcome in outcomes.iter().filter(|o| o.succeeded) {
            let Some(price) = outcome.price else {
                continue;
            };
            let Some(entity) = tracked.get(&outcome.symbol) else {
                warn!(symbol = %outcome.symbol, "Outcome does not match any tracked symbol");
                report.unmatched += 1;
                continue;
            };

            match self
                .repository
                .record_price(entity.id, price, outcome.fetched_at)
                .await
            {
                Ok(_) => {
                    report.recorded += 1;
                    counter!("fincrawl_price_records_total").increment(1);
                }
                Err(e) => {
                    error!(symbol = %outcome.symbol, "Failed to record price: {}", e);
                    report.persist_failed += 1;
                }
            }
        }

        report
    }

    /// 取消当前运行
    ///
    /// 丢弃尚未开始的请求，工作器只完成手上的请求。之后的运行在入队后立即被取消。
    ///
    /// # 返回值
    ///
    /// 是否有运行被取消
    pub fn shutdown(&self) -> bool {
        self.stopping.store(true, Ordering::SeqCst);
        match self.active_queue.lock().as_ref() {
            Some(queue) => {
                let discarded = queue.cancel();
                info!(discarded = discarded.len(), "Active crawl run cancelled");
                true
            }
            None => false,
        }
    }

    /// 等待门回到 Idle
    ///
    /// # 返回值
    ///
    /// 在 `timeout` 内回到 Idle 返回 `true`
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        self.gate.wait_idle(timeout).await
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    pub fn last_summary(&self) -> Option<CrawlSummary> {
        self.last_summary.lock().clone()
    }

    /// 状态探针
    pub fn status(&self) -> CrawlStatus {
        let last_summary = self.last_summary();
        match self.gate.state() {
            CrawlRunState::Running {
                run_id,
                started_at,
                phase,
            } => CrawlStatus {
                running: true,
                run_id: Some(run_id),
                phase: Some(phase),
                started_at: Some(started_at),
                last_summary,
            },
            CrawlRunState::Idle => CrawlStatus {
                running: false,
                run_id: None,
                phase: None,
                started_at: None,
                last_summary,
            },
        }
    }
}

#[cfg(test)]
#[path = "crawl_orchestrator_test.rs"]
mod tests;
