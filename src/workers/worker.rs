// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

/// 队列消费者
///
/// 由 `WorkerManager` 在运行期间启动，队列关闭且排空后 `run` 返回
#[async_trait]
pub trait Worker: Send + Sync {
    /// 持续消费抓取请求，直到队列关闭
    async fn run(&self);

    /// 用于日志的工作器标识
    fn name(&self) -> &str;
}
