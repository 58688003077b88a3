// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ExtractedRecord;
use crate::domain::models::scrape_job::ScrapeJob;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

/// 页面或图片获取错误
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected status code: {0}")]
    Status(u16),
    /// URL 无法解析或协议不受支持
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// URL 指向被禁止的地址
    #[error("Blocked URL: {0}")]
    Blocked(String),
    /// 重定向次数超过上限
    #[error("Stopped after {0} redirects")]
    TooManyRedirects(usize),
    /// 图片超过大小上限
    #[error("Image exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },
    /// 文件写入失败
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// 判断错误是否可能通过重试恢复
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Status(code) => *code >= 500 || *code == 429,
            FetchError::Io(_) => true,
            FetchError::InvalidUrl(_)
            | FetchError::Blocked(_)
            | FetchError::TooManyRedirects(_)
            | FetchError::TooLarge { .. } => false,
        }
    }

    /// 记录获取失败
    ///
    /// 可重试的错误记为 error，被拦截、地址无效等不会自行恢复的错误记为 warn
    pub fn report(&self, context: &str) {
        if self.is_retryable() {
            error!(retryable = true, "{}: {}", context, self);
        } else {
            warn!(retryable = false, "{}: {}", context, self);
        }
    }
}

/// 房源抓取策略特质
///
/// 每个实现对应一个第三方站点。抓取失败不会以错误形式返回，
/// 而是记录日志后返回 `None`，由执行器决定如何归类。
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 判断是否能处理该URL（按主机名匹配，不区分大小写）
    fn can_handle(&self, url: &str) -> bool;

    /// 获取页面并提取房源数据
    ///
    /// # 参数
    ///
    /// * `job` - 抓取任务
    ///
    /// # 返回值
    ///
    /// 识别出房源数据时返回提取结果，否则返回 None
    async fn extract(&self, job: &ScrapeJob) -> Option<ExtractedRecord>;

    /// 下载房源图片到本地
    ///
    /// # 参数
    ///
    /// * `vote_option_id` - 投票选项ID，决定文件名
    /// * `picture_url` - 远程图片地址
    ///
    /// # 返回值
    ///
    /// 成功时返回本地文件路径，任何网络或写入错误都返回 None
    async fn fetch_image(&self, vote_option_id: i64, picture_url: &str) -> Option<PathBuf>;
}
