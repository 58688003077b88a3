// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 抓取任务
///
/// 将一个外部房源链接与它所丰富的投票选项关联起来。
/// 任务创建后不可变，由事件入口或重试调度器持有。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeJob {
    /// 目标URL
    pub target_url: String,
    /// 投票选项ID
    pub vote_option_id: i64,
}

impl ScrapeJob {
    pub fn new(target_url: impl Into<String>, vote_option_id: i64) -> Self {
        Self {
            target_url: target_url.into(),
            vote_option_id,
        }
    }
}
