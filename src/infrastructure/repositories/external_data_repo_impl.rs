// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{ExternalDataRecord, LocalPicture};
use crate::domain::repositories::external_data_repository::ExternalDataRepository;
use crate::infrastructure::database::entities::{local_picture_store, vote_option_external_data};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use std::sync::Arc;

/// 单条 IN 查询的参数上限，SQLite 和 Postgres 的绑定参数数量都有限制
pub const ID_CHUNK_SIZE: usize = 1000;

/// 外部数据仓库实现
#[derive(Clone)]
pub struct ExternalDataRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ExternalDataRepositoryImpl {
    /// 创建新的外部数据仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExternalDataRepository for ExternalDataRepositoryImpl {
    async fn find_by_option_id(
        &self,
        vote_option_id: i64,
    ) -> Result<Option<ExternalDataRecord>, RepositoryError> {
        let model = vote_option_external_data::Entity::find()
            .filter(vote_option_external_data::Column::VoteOptionId.eq(vote_option_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_option_ids(
        &self,
        vote_option_ids: &[i64],
    ) -> Result<Vec<ExternalDataRecord>, RepositoryError> {
        let mut records = Vec::new();
        for chunk in vote_option_ids.chunks(ID_CHUNK_SIZE) {
            let models = vote_option_external_data::Entity::find()
                .filter(vote_option_external_data::Column::VoteOptionId.is_in(chunk.to_vec()))
                .all(self.db.as_ref())
                .await?;
            records.extend(models.into_iter().map(ExternalDataRecord::from));
        }

        Ok(records)
    }

    async fn upsert(&self, record: &ExternalDataRecord) -> Result<(), RepositoryError> {
        use vote_option_external_data::Column;

        let model = vote_option_external_data::ActiveModel {
            id: NotSet,
            vote_option_id: Set(record.vote_option_id),
            source_url: Set(record.source_url.clone()),
            title: Set(record.title.clone()),
            review_count: Set(record.review_count),
            star_rating: Set(record.star_rating),
            picture_url: Set(record.picture_url.clone()),
            picture_local_id: Set(record.picture_local_id),
            raw_payload: Set(Some(record.raw_payload.clone())),
            updated_at: Set(record.updated_at.into()),
        };

        vote_option_external_data::Entity::insert(model)
            .on_conflict(
                OnConflict::column(Column::VoteOptionId)
                    .update_columns([
                        Column::SourceUrl,
                        Column::Title,
                        Column::ReviewCount,
                        Column::StarRating,
                        Column::PictureUrl,
                        Column::PictureLocalId,
                        Column::RawPayload,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn insert_local_picture(&self, local_path: &str) -> Result<i64, RepositoryError> {
        let model = local_picture_store::ActiveModel {
            id: NotSet,
            local_path: Set(local_path.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved.id)
    }

    async fn update_picture_ref(
        &self,
        vote_option_id: i64,
        picture_local_id: i64,
    ) -> Result<(), RepositoryError> {
        use vote_option_external_data::Column;

        let result = vote_option_external_data::Entity::update_many()
            .col_expr(Column::PictureLocalId, Expr::value(picture_local_id))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(Column::VoteOptionId.eq(vote_option_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_local_picture(&self, id: i64) -> Result<Option<LocalPicture>, RepositoryError> {
        let model = local_picture_store::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(|m| LocalPicture {
            id: m.id,
            local_path: m.local_path,
        }))
    }
}

impl From<vote_option_external_data::Model> for ExternalDataRecord {
    fn from(model: vote_option_external_data::Model) -> Self {
        Self {
            vote_option_id: model.vote_option_id,
            source_url: model.source_url,
            title: model.title,
            review_count: model.review_count,
            star_rating: model.star_rating,
            picture_url: model.picture_url,
            picture_local_id: model.picture_local_id,
            raw_payload: model.raw_payload.unwrap_or(serde_json::Value::Null),
            updated_at: model.updated_at.into(),
        }
    }
}

#[cfg(test)]
#[path = "external_data_repo_impl_test.rs"]
mod tests;
