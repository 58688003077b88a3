// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ExternalDataRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 投票选项外部数据响应
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDataDto {
    pub vote_option_id: i64,
    pub title: String,
    pub review_count: i32,
    pub star_rating: f64,
    pub picture_url: String,
    pub has_picture_downloaded: bool,
    pub source_url: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ExternalDataRecord> for ExternalDataDto {
    fn from(record: ExternalDataRecord) -> Self {
        Self {
            has_picture_downloaded: record.has_picture(),
            vote_option_id: record.vote_option_id,
            title: record.title,
            review_count: record.review_count,
            star_rating: record.star_rating,
            picture_url: record.picture_url,
            source_url: record.source_url,
            updated_at: record.updated_at,
        }
    }
}
