// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finance::{Finance, FinanceUpdate, PriceRecord};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 金融标的仓库特质
///
/// 定义标的资源的CRUD操作和价格历史查询
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    /// 列出全部标的
    async fn find_all(&self) -> Result<Vec<Finance>, RepositoryError>;

    /// 根据代码查找标的
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Finance>, RepositoryError>;

    /// 创建标的
    ///
    /// # 返回值
    ///
    /// * `Err(RepositoryError::AlreadyExists)` - 代码已存在
    async fn create(&self, symbol: &str, is_tracking: bool) -> Result<Finance, RepositoryError>;

    /// 部分更新标的
    ///
    /// # 返回值
    ///
    /// * `Err(RepositoryError::NotFound)` - 代码不存在
    async fn update(&self, symbol: &str, update: FinanceUpdate)
        -> Result<Finance, RepositoryError>;

    /// 删除标的，价格历史级联删除
    async fn delete(&self, symbol: &str) -> Result<(), RepositoryError>;

    /// 查询时间区间（开区间）内的价格历史
    async fn find_history(
        &self,
        finance_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceRecord>, RepositoryError>;
}
