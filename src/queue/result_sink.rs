// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl::FetchOutcome;
use parking_lot::Mutex;

/// 抓取结果收集器
///
/// 多个工作器可并发写入，结果按完成顺序保存
#[derive(Debug, Default)]
pub struct ResultSink {
    outcomes: Mutex<Vec<FetchOutcome>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个抓取结果
    pub fn add(&self, outcome: FetchOutcome) {
        self.outcomes.lock().push(outcome);
    }

    /// 返回当前结果的拷贝，后续写入不影响返回值
    pub fn snapshot(&self) -> Vec<FetchOutcome> {
        self.outcomes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.lock().is_empty()
    }
}
