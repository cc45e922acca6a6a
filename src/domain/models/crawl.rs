// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 抓取请求
///
/// 编排器入队时由标的代码一对一生成，由某个工作器恰好消费一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// 标的代码，例如 `AAPL:NASDAQ`
    pub symbol: String,
}

impl CrawlRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

/// 抓取失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// 等待价格元素超时
    Timeout,
    /// 页面中没有价格内容
    NotFound,
    /// 其他非预期错误，不重试
    Unexpected,
    /// 请求在产生结果前被取消或丢失
    Cancelled,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "timeout"),
            FetchErrorKind::NotFound => write!(f, "not_found"),
            FetchErrorKind::Unexpected => write!(f, "unexpected"),
            FetchErrorKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 单个标的的抓取结果
///
/// 由抓取客户端产生，创建后不可变。失败同样以值的形式表达。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub symbol: String,
    pub price: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
    pub succeeded: bool,
    pub error: Option<FetchErrorKind>,
    /// 实际进行的尝试次数
    pub attempts: u32,
}

impl FetchOutcome {
    /// 创建成功结果
    pub fn success(symbol: impl Into<String>, price: Decimal, attempts: u32) -> Self {
        Self {
            symbol: symbol.into(),
            price: Some(price),
            fetched_at: Utc::now(),
            succeeded: true,
            error: None,
            attempts,
        }
    }

    /// 创建失败结果
    pub fn failure(symbol: impl Into<String>, error: FetchErrorKind, attempts: u32) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            fetched_at: Utc::now(),
            succeeded: false,
            error: Some(error),
            attempts,
        }
    }
}

/// 抓取运行所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    Acquiring,
    Populating,
    Draining,
    Reconciling,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CrawlPhase::Acquiring => write!(f, "acquiring"),
            CrawlPhase::Populating => write!(f, "populating"),
            CrawlPhase::Draining => write!(f, "draining"),
            CrawlPhase::Reconciling => write!(f, "reconciling"),
        }
    }
}

/// 进程级抓取运行状态
///
/// 任意时刻最多存在一个 `Running`。
/// 状态转换：Idle → Running（获取成功）、Running → Idle（完成或失败，包括 panic）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlRunState {
    #[default]
    Idle,
    Running {
        run_id: Uuid,
        started_at: DateTime<Utc>,
        phase: CrawlPhase,
    },
}

impl CrawlRunState {
    pub fn is_running(&self) -> bool {
        matches!(self, CrawlRunState::Running { .. })
    }

    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            CrawlRunState::Running { run_id, .. } => Some(*run_id),
            CrawlRunState::Idle => None,
        }
    }
}

/// 一次抓取运行的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub run_id: Uuid,
    /// 入队的请求数
    pub started: usize,
    /// 抓取成功的标的数
    pub succeeded: usize,
    /// 抓取失败的标的数（started - succeeded）
    pub failed: usize,
    /// 写入的价格记录数
    pub recorded: usize,
    /// 无法匹配到已跟踪标的的成功结果数
    pub unmatched: usize,
    /// 写入价格记录失败的数量
    pub persist_failed: usize,
    /// 工作器未在时间窗口内退出
    pub degraded: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
