// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::scrape_outcome::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 重试台账条目
///
/// 首次失败时创建（计数为1），之后每次失败计数加一并覆盖错误信息，
/// 成功后移除。只存在于进程内存中。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryLedgerEntry {
    pub job: ScrapeJob,
    pub failure_count: u32,
    pub last_attempt: DateTime<Utc>,
    pub last_error: Option<String>,
    pub failure_kind: FailureKind,
}

impl RetryLedgerEntry {
    pub fn first_failure(job: ScrapeJob, error: Option<String>, kind: FailureKind) -> Self {
        Self {
            job,
            failure_count: 1,
            last_attempt: Utc::now(),
            last_error: error,
            failure_kind: kind,
        }
    }

    /// 返回计数加一、刷新错误与时间后的副本
    pub fn next_failure(&self, job: ScrapeJob, error: Option<String>, kind: FailureKind) -> Self {
        Self {
            job,
            failure_count: self.failure_count.saturating_add(1),
            last_attempt: Utc::now(),
            last_error: error,
            failure_kind: kind,
        }
    }
}

/// 台账统计信息，仅用于观测
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatistics {
    pub total_failed: usize,
    pub max_retries: u32,
    pub avg_retries: f64,
    pub full_scrape_failed: usize,
    pub picture_download_failed: usize,
}
