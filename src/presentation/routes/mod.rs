// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::finance_repository::FinanceRepository;
use crate::domain::repositories::price_repository::PriceRepository;
use crate::presentation::handlers::{crawl_handler, finance_handler};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// 所有端点挂载在 `/api` 下。仓库和编排器通过 `Extension` 层注入。
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes<R>() -> Router
where
    R: FinanceRepository + PriceRepository + 'static,
{
    let api = Router::new()
        .route("/healthz", get(health_check))
        .route("/version", get(version))
        .route(
            "/finances",
            get(finance_handler::list_finances::<R>).post(finance_handler::create_finance::<R>),
        )
        .route("/finances/crawl", post(crawl_handler::trigger_crawl::<R>))
        .route(
            "/finances/crawl/status",
            get(crawl_handler::crawl_status::<R>),
        )
        .route(
            "/finances/{symbol}",
            get(finance_handler::get_finance::<R>)
                .put(finance_handler::update_finance::<R>)
                .delete(finance_handler::delete_finance::<R>),
        );

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Resource not found", "status": 404 })),
    )
}
