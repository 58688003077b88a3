// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 仓库层错误类型
///
/// 投票选项仓库和外部数据仓库共用；`NotFound` 在 HTTP 层映射为 404
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("未找到数据")]
    NotFound,

    #[error("无效参数: {0}")]
    InvalidParameter(String),
}
