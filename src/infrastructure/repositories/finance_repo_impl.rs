// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::finance::{Finance, FinanceUpdate, PriceRecord, TrackedSymbol};
use crate::domain::repositories::finance_repository::FinanceRepository;
use crate::domain::repositories::price_repository::PriceRepository;
use crate::infrastructure::database::entities::{finance, finance_history};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sea_orm::*;
use std::sync::Arc;
use tracing::warn;

/// 金融标的仓库实现
///
/// 同时提供抓取编排所需的价格仓库能力和CRUD层的标的仓库能力
pub struct FinanceRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl FinanceRepositoryImpl {
    /// 创建新的标的仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的标的仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_model(&self, symbol: &str) -> Result<Option<finance::Model>, RepositoryError> {
        let model = finance::Entity::find()
            .filter(finance::Column::Symbol.eq(symbol))
            .one(self.db.as_ref())
            .await?;
        Ok(model)
    }
}

fn to_f64(value: Decimal) -> Result<f64, RepositoryError> {
    value
        .to_f64()
        .ok_or_else(|| RepositoryError::InvalidParameter(format!("{} is not representable", value)))
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

fn to_offset(value: DateTime<Utc>) -> DateTime<FixedOffset> {
    value.into()
}

impl From<finance::Model> for Finance {
    fn from(m: finance::Model) -> Self {
        Finance {
            id: m.id,
            symbol: m.symbol,
            is_tracking: m.is_tracking,
            last_closing_price: m.last_closing_price.and_then(to_decimal),
            daily_change_value: m.daily_change_value.and_then(to_decimal),
            daily_change_percentage: m.daily_change_percentage,
            created_at: m.created_at.into(),
            updated_at: m.updated_at.into(),
        }
    }
}

/// 把历史行转换为领域记录，无法表示为十进制的价格（NaN、无穷）被跳过
fn history_record(m: finance_history::Model) -> Option<PriceRecord> {
    match to_decimal(m.current_price) {
        Some(current_price) => Some(PriceRecord {
            id: m.id,
            finance_id: m.finance_id,
            current_price,
            created_at: m.created_at.into(),
        }),
        None => {
            warn!(
                id = m.id,
                finance_id = m.finance_id,
                value = m.current_price,
                "Skipping price history row with non-finite price"
            );
            None
        }
    }
}

/// 唯一约束冲突映射为 `AlreadyExists`，并发创建同一代码时不会变成数据库错误
fn map_insert_error(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::AlreadyExists,
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl PriceRepository for FinanceRepositoryImpl {
    async fn list_tracked_symbols(&self) -> Result<Vec<TrackedSymbol>, RepositoryError> {
        let models = finance::Entity::find()
            .filter(finance::Column::IsTracking.eq(true))
            .order_by_asc(finance::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| TrackedSymbol {
                id: m.id,
                symbol: m.symbol,
            })
            .collect())
    }

    async fn record_price(
        &self,
        finance_id: i32,
        price: Decimal,
        fetched_at: DateTime<Utc>,
    ) -> Result<PriceRecord, RepositoryError> {
        let value = to_f64(price)?;
        let txn = self.db.begin().await?;

        let finance_model = finance::Entity::find_by_id(finance_id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let history = finance_history::ActiveModel {
            finance_id: Set(finance_id),
            current_price: Set(value),
            created_at: Set(to_offset(fetched_at)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: finance::ActiveModel = finance_model.into();
        active.last_closing_price = Set(Some(value));
        active.updated_at = Set(to_offset(Utc::now()));
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(PriceRecord {
            id: history.id,
            finance_id,
            current_price: price,
            created_at: history.created_at.into(),
        })
    }
}

#[async_trait]
impl FinanceRepository for FinanceRepositoryImpl {
    async fn find_all(&self) -> Result<Vec<Finance>, RepositoryError> {
        let models = finance::Entity::find()
            .order_by_asc(finance::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Finance>, RepositoryError> {
        Ok(self.find_model(symbol).await?.map(Into::into))
    }

    async fn create(&self, symbol: &str, is_tracking: bool) -> Result<Finance, RepositoryError> {
        if self.find_model(symbol).await?.is_some() {
            return Err(RepositoryError::AlreadyExists);
        }

        let now = to_offset(Utc::now());
        let model = finance::ActiveModel {
            symbol: Set(symbol.to_string()),
            is_tracking: Set(is_tracking),
            last_closing_price: Set(None),
            daily_change_value: Set(None),
            daily_change_percentage: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(map_insert_error)?;

        Ok(model.into())
    }

    async fn update(
        &self,
        symbol: &str,
        update: FinanceUpdate,
    ) -> Result<Finance, RepositoryError> {
        let mut model: finance::ActiveModel = self
            .find_model(symbol)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        if let Some(is_tracking) = update.is_tracking {
            model.is_tracking = Set(is_tracking);
        }
        if let Some(price) = update.last_closing_price {
            model.last_closing_price = Set(Some(to_f64(price)?));
        }
        if let Some(change) = update.daily_change_value {
            model.daily_change_value = Set(Some(to_f64(change)?));
        }
        if let Some(percentage) = update.daily_change_percentage {
            model.daily_change_percentage = Set(Some(percentage));
        }
        model.updated_at = Set(to_offset(Utc::now()));

        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn delete(&self, symbol: &str) -> Result<(), RepositoryError> {
        let model = self
            .find_model(symbol)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let txn = self.db.begin().await?;
        finance_history::Entity::delete_many()
            .filter(finance_history::Column::FinanceId.eq(model.id))
            .exec(&txn)
            .await?;
        finance::Entity::delete_by_id(model.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    async fn find_history(
        &self,
        finance_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceRecord>, RepositoryError> {
        let models = finance_history::Entity::find()
            .filter(finance_history::Column::FinanceId.eq(finance_id))
            .filter(finance_history::Column::CreatedAt.gt(to_offset(from)))
            .filter(finance_history::Column::CreatedAt.lt(to_offset(to)))
            .order_by_asc(finance_history::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().filter_map(history_record).collect())
    }
}
