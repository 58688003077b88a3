// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::usecases::create_vote_option::CreateVoteOptionUseCase;
use crate::domain::services::external_data_service::ExternalDataService;
use crate::presentation::handlers::{external_data_handler, retry_handler, vote_option_handler};
use crate::workers::retry_worker::RetryWorker;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// 路由处理器依赖的共享组件
#[derive(Clone)]
pub struct ApiComponents {
    pub create_vote_option: Arc<CreateVoteOptionUseCase>,
    pub external_data: Arc<ExternalDataService>,
    pub retry_worker: Arc<RetryWorker>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route(
            "/v1/votes/{vote_id}/options",
            post(vote_option_handler::create_vote_option),
        )
        .route(
            "/v1/options/external-data",
            post(external_data_handler::get_external_data_batch),
        )
        .route(
            "/v1/options/{option_id}/external-data",
            get(external_data_handler::get_external_data),
        )
        .route(
            "/v1/options/{option_id}/picture",
            get(external_data_handler::get_picture),
        )
        .route("/v1/scrape/retry", post(retry_handler::trigger_retry))
        .route(
            "/v1/scrape/retry/statistics",
            get(retry_handler::retry_statistics),
        );

    Router::new().merge(public_routes).merge(api_routes)
}

/// 创建带共享组件的完整应用
pub fn app(components: ApiComponents) -> Router {
    routes().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(components.create_vote_option))
            .layer(Extension(components.external_data))
            .layer(Extension(components.retry_worker)),
    )
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
