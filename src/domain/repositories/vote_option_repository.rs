// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vote_option::{NewVoteOption, VoteOption};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 投票选项仓库特质
///
/// 抓取流水线只读取选项，创建接口仅供事件入口使用
#[async_trait]
pub trait VoteOptionRepository: Send + Sync {
    /// 创建投票选项
    async fn create(&self, option: &NewVoteOption) -> Result<VoteOption, RepositoryError>;
    /// 根据ID查找投票选项
    async fn find_by_id(&self, id: i64) -> Result<Option<VoteOption>, RepositoryError>;
    /// 查找所有带外部链接的选项，返回 (选项ID, 链接)
    async fn find_with_external_link(&self) -> Result<Vec<(i64, String)>, RepositoryError>;
}
