// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vote_option::EXTERNAL_LINK_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// 创建投票选项请求数据传输对象
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoteOptionDto {
    /// 选项名称
    #[validate(length(min = 1, max = 255))]
    pub label: String,
    /// 选项描述
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// 外部房源链接，存在时触发抓取
    #[validate(url)]
    pub external_link: Option<String>,
    /// 其他附加信息，原样存入选项数据
    pub details: Option<Map<String, Value>>,
}

impl CreateVoteOptionDto {
    /// 去掉空白后的外部链接
    pub fn trimmed_link(&self) -> Option<&str> {
        self.external_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }

    /// 构建选项的数据字段
    ///
    /// `details` 中的同名键会被描述和外部链接覆盖；没有任何内容时返回 None
    pub fn option_data(&self) -> Option<Value> {
        let mut data = self.details.clone().unwrap_or_default();
        if let Some(description) = &self.description {
            data.insert("description".to_string(), Value::from(description.clone()));
        }
        if let Some(link) = self.trimmed_link() {
            data.insert(EXTERNAL_LINK_KEY.to_string(), Value::from(link));
        }

        if data.is_empty() {
            None
        } else {
            Some(Value::Object(data))
        }
    }
}
