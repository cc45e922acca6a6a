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

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    domain::{
        repositories::price_repository::PriceRepository,
        services::crawl_orchestrator::{CrawlError, CrawlOrchestrator, CrawlStatus},
    },
    presentation::errors::AppError,
};

#[derive(Debug, Serialize)]
struct CrawlStatusResponse {
    message: &'static str,
    #[serde(flatten)]
    status: CrawlStatus,
}

/// 触发一次抓取运行
///
/// 立即返回，运行在后台进行。已有运行时返回 409
pub async fn trigger_crawl<R>(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator<R>>>,
) -> impl IntoResponse
where
    R: PriceRepository + 'static,
{
    match orchestrator.trigger() {
        Ok(run) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Request processor started.",
                "run_id": run.run_id,
            })),
        )
            .into_response(),
        Err(CrawlError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Request processor currently running." })),
        )
            .into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// 查询抓取运行状态
pub async fn crawl_status<R>(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator<R>>>,
) -> impl IntoResponse
where
    R: PriceRepository + 'static,
{
    let status = orchestrator.status();
    let message = if status.running {
        "Request processor currently running"
    } else {
        "Request processor is available"
    };

    Json(CrawlStatusResponse { message, status })
}
