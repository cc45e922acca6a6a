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

use crate::{
    application::dto::{
        finance_request::{parse_timestamp, CreateFinanceDto, FinanceDetailsQuery, UpdateFinanceDto},
        finance_response::FinanceDetailsResponse,
    },
    domain::{
        models::finance::{Finance, FinanceUpdate},
        repositories::finance_repository::FinanceRepository,
    },
    utils::errors::RepositoryError,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::Validate;

/// 默认的历史查询窗口
const DEFAULT_HISTORY_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum FinanceUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Finance '{0}' not found")]
    NotFound(String),
    #[error("Finance '{0}' already exists")]
    AlreadyExists(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 标的资源用例
pub struct FinanceUseCase<R> {
    repo: Arc<R>,
}

impl<R> FinanceUseCase<R>
where
    R: FinanceRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Finance>, FinanceUseCaseError> {
        Ok(self.repo.find_all().await?)
    }

    /// 查询标的详情
    ///
    /// 请求历史时，默认窗口为最近7天，区间两端不包含
    pub async fn details(
        &self,
        symbol: &str,
        query: FinanceDetailsQuery,
    ) -> Result<FinanceDetailsResponse, FinanceUseCaseError> {
        let finance = self
            .repo
            .find_by_symbol(symbol)
            .await?
            .ok_or_else(|| FinanceUseCaseError::NotFound(symbol.to_string()))?;

        if !query.with_history {
            return Ok(FinanceDetailsResponse {
                finance,
                history: None,
            });
        }

        let now = Utc::now();
        let from = match query.from_ts.as_deref() {
            Some(raw) => parse_timestamp(raw).map_err(FinanceUseCaseError::ValidationError)?,
            None => now - Duration::days(DEFAULT_HISTORY_DAYS),
        };
        let to = match query.to_ts.as_deref() {
            Some(raw) => parse_timestamp(raw).map_err(FinanceUseCaseError::ValidationError)?,
            None => now,
        };
        if from > to {
            return Err(FinanceUseCaseError::ValidationError(
                "from_ts must not be later than to_ts".to_string(),
            ));
        }

        let history = self.repo.find_history(finance.id, from, to).await?;
        Ok(FinanceDetailsResponse {
            finance,
            history: Some(history),
        })
    }

    pub async fn create(&self, dto: CreateFinanceDto) -> Result<Finance, FinanceUseCaseError> {
        dto.validate()
            .map_err(|e| FinanceUseCaseError::ValidationError(e.to_string()))?;

        let symbol = dto.symbol.trim();
        if symbol.is_empty() {
            return Err(FinanceUseCaseError::ValidationError(
                "symbol must not be blank".to_string(),
            ));
        }

        let finance = self
            .repo
            .create(symbol, dto.is_tracking.unwrap_or(true))
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => {
                    FinanceUseCaseError::AlreadyExists(symbol.to_string())
                }
                other => other.into(),
            })?;

        info!(symbol = %finance.symbol, id = finance.id, "Finance created");
        Ok(finance)
    }

    pub async fn update(
        &self,
        symbol: &str,
        dto: UpdateFinanceDto,
    ) -> Result<Finance, FinanceUseCaseError> {
        dto.validate()
            .map_err(|e| FinanceUseCaseError::ValidationError(e.to_string()))?;

        let update = FinanceUpdate {
            is_tracking: dto.is_tracking,
            last_closing_price: dto.last_closing_price,
            daily_change_value: dto.daily_change_value,
            daily_change_percentage: dto.daily_change_percentage,
        };

        self.repo
            .update(symbol, update)
            .await
            .map_err(|e| Self::not_found_or(e, symbol))
    }

    pub async fn delete(&self, symbol: &str) -> Result<(), FinanceUseCaseError> {
        self.repo
            .delete(symbol)
            .await
            .map_err(|e| Self::not_found_or(e, symbol))?;
        info!(symbol = %symbol, "Finance deleted");
        Ok(())
    }

    fn not_found_or(e: RepositoryError, symbol: &str) -> FinanceUseCaseError {
        match e {
            RepositoryError::NotFound => FinanceUseCaseError::NotFound(symbol.to_string()),
            other => other.into(),
        }
    }
}
