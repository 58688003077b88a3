// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vote_option::{NewVoteOption, VoteOption};
use crate::domain::repositories::vote_option_repository::VoteOptionRepository;
use crate::infrastructure::database::entities::vote_option;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;

/// 投票选项仓库实现
#[derive(Clone)]
pub struct VoteOptionRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl VoteOptionRepositoryImpl {
    /// 创建新的投票选项仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteOptionRepository for VoteOptionRepositoryImpl {
    async fn create(&self, option: &NewVoteOption) -> Result<VoteOption, RepositoryError> {
        let model = vote_option::ActiveModel {
            id: NotSet,
            vote_id: Set(option.vote_id),
            label: Set(option.label.clone()),
            data: Set(option.data.clone()),
            created_at: Set(Utc::now().into()),
        };

        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<VoteOption>, RepositoryError> {
        let model = vote_option::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_with_external_link(&self) -> Result<Vec<(i64, String)>, RepositoryError> {
        // JSON operators differ between Postgres and SQLite, so the link is read in Rust
        let models = vote_option::Entity::find()
            .filter(vote_option::Column::Data.is_not_null())
            .order_by_asc(vote_option::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(VoteOption::from)
            .filter_map(|option| option.external_link().map(|link| (option.id, link)))
            .collect())
    }
}

impl From<vote_option::Model> for VoteOption {
    fn from(model: vote_option::Model) -> Self {
        Self {
            id: model.id,
            vote_id: model.vote_id,
            label: model.label,
            data: model.data,
            created_at: model.created_at.into(),
        }
    }
}
