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

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    application::{
        dto::{
            finance_request::{CreateFinanceDto, FinanceDetailsQuery, UpdateFinanceDto},
            finance_response::{FinanceRefResponse, FinanceSummaryResponse},
        },
        use_cases::finance_use_case::FinanceUseCase,
    },
    domain::repositories::finance_repository::FinanceRepository,
    presentation::errors::AppError,
};

/// 列出全部标的
pub async fn list_finances<R>(
    Extension(repo): Extension<Arc<R>>,
) -> Result<impl IntoResponse, AppError>
where
    R: FinanceRepository + 'static,
{
    let finances = FinanceUseCase::new(repo).list().await?;
    let body: Vec<FinanceSummaryResponse> = finances.iter().map(Into::into).collect();
    Ok(Json(body))
}

/// 获取标的详情，可选附带价格历史
pub async fn get_finance<R>(
    Extension(repo): Extension<Arc<R>>,
    Path(symbol): Path<String>,
    Query(query): Query<FinanceDetailsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    R: FinanceRepository + 'static,
{
    let details = FinanceUseCase::new(repo).details(&symbol, query).await?;
    Ok(Json(details))
}

/// 创建标的
pub async fn create_finance<R>(
    Extension(repo): Extension<Arc<R>>,
    Json(payload): Json<CreateFinanceDto>,
) -> Result<impl IntoResponse, AppError>
where
    R: FinanceRepository + 'static,
{
    let finance = FinanceUseCase::new(repo).create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(FinanceRefResponse::from(&finance)),
    ))
}

/// 更新标的
pub async fn update_finance<R>(
    Extension(repo): Extension<Arc<R>>,
    Path(symbol): Path<String>,
    Json(payload): Json<UpdateFinanceDto>,
) -> Result<impl IntoResponse, AppError>
where
    R: FinanceRepository + 'static,
{
    let finance = FinanceUseCase::new(repo).update(&symbol, payload).await?;
    Ok(Json(FinanceRefResponse::from(&finance)))
}

/// 删除标的
pub async fn delete_finance<R>(
    Extension(repo): Extension<Arc<R>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: FinanceRepository + 'static,
{
    FinanceUseCase::new(repo).delete(&symbol).await?;
    Ok(StatusCode::NO_CONTENT)
}
