// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{ExternalDataRecord, LocalPicture};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 外部数据仓库特质
///
/// 管理投票选项的外部数据以及本地图片记录
#[async_trait]
pub trait ExternalDataRepository: Send + Sync {
    /// 根据投票选项ID查找外部数据
    async fn find_by_option_id(
        &self,
        vote_option_id: i64,
    ) -> Result<Option<ExternalDataRecord>, RepositoryError>;

    /// 批量查找外部数据
    async fn find_by_option_ids(
        &self,
        vote_option_ids: &[i64],
    ) -> Result<Vec<ExternalDataRecord>, RepositoryError>;

    /// 按投票选项ID插入或覆盖外部数据
    ///
    /// 同一个选项最多只有一行，重复调用以最后一次写入为准
    async fn upsert(&self, record: &ExternalDataRecord) -> Result<(), RepositoryError>;

    /// 保存本地图片路径，返回图片记录ID
    async fn insert_local_picture(&self, local_path: &str) -> Result<i64, RepositoryError>;

    /// 更新外部数据的本地图片引用
    ///
    /// 外部数据不存在时返回 `RepositoryError::NotFound`
    async fn update_picture_ref(
        &self,
        vote_option_id: i64,
        picture_local_id: i64,
    ) -> Result<(), RepositoryError>;

    /// 根据ID查找本地图片记录
    async fn find_local_picture(&self, id: i64) -> Result<Option<LocalPicture>, RepositoryError>;
}
