// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::finance_use_case::FinanceUseCaseError;
use crate::domain::services::crawl_orchestrator::CrawlError;
use crate::utils::errors::RepositoryError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

fn repository_status(e: &RepositoryError) -> StatusCode {
    match e {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::AlreadyExists => StatusCode::CONFLICT,
        RepositoryError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        RepositoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<FinanceUseCaseError>() {
            return match e {
                FinanceUseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
                FinanceUseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
                FinanceUseCaseError::AlreadyExists(_) => StatusCode::CONFLICT,
                FinanceUseCaseError::Repository(inner) => repository_status(inner),
            };
        }
        if let Some(e) = self.0.downcast_ref::<CrawlError>() {
            return match e {
                CrawlError::AlreadyRunning => StatusCode::CONFLICT,
                CrawlError::Repository(inner) => repository_status(inner),
                CrawlError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(e) = self.0.downcast_ref::<RepositoryError>() {
            return repository_status(e);
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({
            "message": self.0.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
