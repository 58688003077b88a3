// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::retry_response::RetryTriggerResponse;
use crate::workers::retry_worker::{RetryStatistics, RetryWorker};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::info;

/// 手动触发一次重试周期
///
/// 已有周期在运行时等待其结束后再执行，响应包含本次周期的结果
pub async fn trigger_retry(
    Extension(worker): Extension<Arc<RetryWorker>>,
) -> Json<RetryTriggerResponse> {
    info!("Manual retry triggered");
    let report = worker.run_cycle().await;
    Json(report.into())
}

/// 重试台账统计
pub async fn retry_statistics(
    Extension(worker): Extension<Arc<RetryWorker>>,
) -> Json<RetryStatistics> {
    Json(worker.statistics())
}
