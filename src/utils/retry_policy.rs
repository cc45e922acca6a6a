// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl::FetchErrorKind;
use std::time::Duration;

/// 失败后的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// 等待退避时间后再次尝试
    Retry,
    /// 立即放弃该标的
    Abort,
}

/// 失败类型到处理决定的映射表
///
/// 只有超时和内容缺失会重试，其余失败立即放弃。
pub const RETRY_TABLE: &[(FetchErrorKind, RetryDecision)] = &[
    (FetchErrorKind::Timeout, RetryDecision::Retry),
    (FetchErrorKind::NotFound, RetryDecision::Retry),
    (FetchErrorKind::Unexpected, RetryDecision::Abort),
];

/// 查询失败类型对应的处理决定，表中未列出的类型一律放弃
pub fn decision_for(kind: FetchErrorKind) -> RetryDecision {
    RETRY_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, decision)| *decision)
        .unwrap_or(RetryDecision::Abort)
}

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数，1.0 表示固定间隔
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 1.0,
            jitter_factor: 0.1,
            enable_jitter: false,
        }
    }
}

impl RetryPolicy {
    /// 创建固定间隔的重试策略
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: delay,
            max_backoff: delay,
            ..Self::default()
        }
    }

    /// 计算第 `attempt` 次尝试失败后的退避时间（attempt 从 1 开始）
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let backoff_secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        // 限制最大退避时间
        let capped_backoff = backoff_secs.min(self.max_backoff.as_secs_f64());

        let final_backoff = if self.enable_jitter {
            let jitter_range = capped_backoff * self.jitter_factor;
            if jitter_range > 0.0 {
                let jitter = rand::random_range(-jitter_range..jitter_range);
                (capped_backoff + jitter).max(0.0)
            } else {
                capped_backoff
            }
        } else {
            capped_backoff
        };

        Duration::from_secs_f64(final_backoff)
    }

    /// 第 `attempt` 次尝试以 `kind` 失败后是否应该再试
    pub fn should_retry(&self, attempt: u32, kind: FetchErrorKind) -> bool {
        attempt < self.max_attempts && decision_for(kind) == RetryDecision::Retry
    }
}
