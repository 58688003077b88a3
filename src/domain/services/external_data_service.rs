// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ExternalDataRecord;
use crate::domain::repositories::external_data_repository::ExternalDataRepository;
use crate::utils::errors::RepositoryError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// 外部数据查询服务
///
/// 只读，供展示层为投票选项附加房源信息。
/// "尚未抓取"和"多次抓取失败"对调用方表现一致：都没有数据。
pub struct ExternalDataService {
    repo: Arc<dyn ExternalDataRepository>,
}

impl ExternalDataService {
    pub fn new(repo: Arc<dyn ExternalDataRepository>) -> Self {
        Self { repo }
    }

    /// 查询单个投票选项的外部数据
    pub async fn get_for_option(
        &self,
        vote_option_id: i64,
    ) -> Result<Option<ExternalDataRecord>, RepositoryError> {
        self.repo.find_by_option_id(vote_option_id).await
    }

    /// 批量查询，结果按投票选项ID索引，没有数据的选项不出现在结果中
    pub async fn get_for_options(
        &self,
        vote_option_ids: &[i64],
    ) -> Result<HashMap<i64, ExternalDataRecord>, RepositoryError> {
        let records = self.repo.find_by_option_ids(vote_option_ids).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.vote_option_id, record))
            .collect())
    }

    /// 获取投票选项图片的本地路径
    ///
    /// # 返回值
    ///
    /// 没有图片记录或文件已不在磁盘上时返回 None
    pub async fn local_picture_path(
        &self,
        vote_option_id: i64,
    ) -> Result<Option<PathBuf>, RepositoryError> {
        let Some(picture_id) = self
            .repo
            .find_by_option_id(vote_option_id)
            .await?
            .and_then(|record| record.picture_local_id)
        else {
            return Ok(None);
        };

        let Some(picture) = self.repo.find_local_picture(picture_id).await? else {
            return Ok(None);
        };

        let path = PathBuf::from(picture.local_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(
                "Picture file for vote option {} is missing: {}",
                vote_option_id,
                path.display()
            );
            return Ok(None);
        }
        Ok(Some(path))
    }
}
