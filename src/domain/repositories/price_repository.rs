// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finance::{PriceRecord, TrackedSymbol};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// 价格仓库特质
///
/// 抓取编排器唯一依赖的持久化能力：运行开始时读取已跟踪标的快照，
/// 运行结束时为每个匹配的成功结果写入价格记录。
/// 失败以类型化错误返回，编排器据此计数而不中断整批运行。
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// 列出所有已跟踪的标的
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<TrackedSymbol>)` - 按ID排序的标的快照
    /// * `Err(RepositoryError)` - 查询失败
    async fn list_tracked_symbols(&self) -> Result<Vec<TrackedSymbol>, RepositoryError>;

    /// 写入价格记录并更新标的的最新价格
    ///
    /// # 参数
    ///
    /// * `finance_id` - 标的ID
    /// * `price` - 抓取到的价格
    /// * `fetched_at` - 抓取时间
    ///
    /// # 返回值
    ///
    /// * `Ok(PriceRecord)` - 新建的价格记录
    /// * `Err(RepositoryError::NotFound)` - 标的不存在
    /// * `Err(RepositoryError)` - 写入失败
    async fn record_price(
        &self,
        finance_id: i32,
        price: Decimal,
        fetched_at: DateTime<Utc>,
    ) -> Result<PriceRecord, RepositoryError>;
}
