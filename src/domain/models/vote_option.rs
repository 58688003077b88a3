// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 选项数据中存放外部链接的字段名
pub const EXTERNAL_LINK_KEY: &str = "externalLink";

/// 投票选项
///
/// 选项的业务字段以 JSON 形式保存在 `data` 中，
/// 抓取流水线只关心其中的外部链接。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub id: i64,
    pub vote_id: i64,
    pub label: String,
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl VoteOption {
    /// 读取选项的外部房源链接
    ///
    /// 字段缺失、为空或不是字符串时返回 None
    pub fn external_link(&self) -> Option<String> {
        self.data
            .as_ref()?
            .get(EXTERNAL_LINK_KEY)?
            .as_str()
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(str::to_string)
    }
}

/// 待创建的投票选项
#[derive(Debug, Clone)]
pub struct NewVoteOption {
    pub vote_id: i64,
    pub label: String,
    pub data: Option<serde_json::Value>,
}
