// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 解析失败时使用的房源名称占位符
pub const UNKNOWN_LISTING_NAME: &str = "Unknown Property";

/// 从页面提取出的房源数据
///
/// 由抓取策略产生的瞬时数据，不直接持久化，
/// 而是映射为 [`ExternalDataRecord`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// 房源名称
    pub name: String,
    /// 远程图片地址
    pub picture_url: String,
    /// 星级评分
    pub star_rating: f64,
    /// 评论数量
    pub review_count: i32,
}

/// 投票选项的外部数据（每个投票选项最多一行）
///
/// `picture_local_id` 为空表示图片尚未下载成功，
/// 这是对账扫描用来识别待补图片的信号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDataRecord {
    /// 投票选项ID（唯一）
    pub vote_option_id: i64,
    /// 来源URL
    pub source_url: String,
    /// 标题
    pub title: String,
    /// 评论数量
    pub review_count: i32,
    /// 星级评分
    pub star_rating: f64,
    /// 远程图片地址
    pub picture_url: String,
    /// 本地图片引用
    pub picture_local_id: Option<i64>,
    /// 原始提取数据
    pub raw_payload: serde_json::Value,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
}

impl ExternalDataRecord {
    /// 由提取结果构建外部数据记录
    pub fn from_extracted(
        vote_option_id: i64,
        source_url: &str,
        record: &ExtractedRecord,
        picture_local_id: Option<i64>,
    ) -> Self {
        Self {
            vote_option_id,
            source_url: source_url.to_string(),
            title: record.name.clone(),
            review_count: record.review_count,
            star_rating: record.star_rating,
            picture_url: record.picture_url.clone(),
            picture_local_id,
            raw_payload: serde_json::to_value(record).unwrap_or_default(),
            updated_at: Utc::now(),
        }
    }

    /// 图片是否已下载
    pub fn has_picture(&self) -> bool {
        self.picture_local_id.is_some()
    }
}

/// 本地图片记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPicture {
    pub id: i64,
    pub local_path: String,
}
