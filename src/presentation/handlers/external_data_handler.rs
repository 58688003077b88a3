// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::external_data_response::ExternalDataDto;
use crate::domain::services::external_data_service::ExternalDataService;
use crate::presentation::errors::AppError;
use crate::utils::errors::RepositoryError;
use axum::{
    extract::{Extension, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// 批量查询的最大选项数
const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchExternalDataRequest {
    pub option_ids: Vec<i64>,
}

/// 获取投票选项的外部数据
pub async fn get_external_data(
    Extension(service): Extension<Arc<ExternalDataService>>,
    Path(option_id): Path<i64>,
) -> Result<Json<ExternalDataDto>, AppError> {
    let record = service
        .get_for_option(option_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(record.into()))
}

/// 批量获取外部数据，键为投票选项ID
pub async fn get_external_data_batch(
    Extension(service): Extension<Arc<ExternalDataService>>,
    Json(payload): Json<BatchExternalDataRequest>,
) -> Result<Json<HashMap<i64, ExternalDataDto>>, AppError> {
    if payload.option_ids.len() > MAX_BATCH_SIZE {
        return Err(RepositoryError::InvalidParameter(format!(
            "at most {} option ids per request",
            MAX_BATCH_SIZE
        ))
        .into());
    }

    let records = service.get_for_options(&payload.option_ids).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|(id, record)| (id, record.into()))
            .collect(),
    ))
}

/// 获取投票选项的本地图片
pub async fn get_picture(
    Extension(service): Extension<Arc<ExternalDataService>>,
    Path(option_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let path = service
        .local_picture_path(option_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let bytes = tokio::fs::read(&path).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
