// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::vote_option_request::CreateVoteOptionDto;
use crate::application::usecases::create_vote_option::CreateVoteOptionUseCase;
use crate::domain::models::vote_option::VoteOption;
use crate::presentation::errors::AppError;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 创建投票选项
///
/// 选项带外部链接时会异步抓取房源数据，响应不等待抓取完成
///
/// # 返回值
///
/// * `201` - 创建成功，返回存储后的选项
/// * `400` - 请求参数验证失败
pub async fn create_vote_option(
    Extension(use_case): Extension<Arc<CreateVoteOptionUseCase>>,
    Path(vote_id): Path<i64>,
    Json(payload): Json<CreateVoteOptionDto>,
) -> Result<(StatusCode, Json<VoteOption>), AppError> {
    payload.validate()?;

    let option = use_case.execute(vote_id, payload).await?;
    Ok((StatusCode::CREATED, Json(option)))
}
