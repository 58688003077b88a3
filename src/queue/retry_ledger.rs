// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::retry_entry::{LedgerStatistics, RetryLedgerEntry};
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::scrape_outcome::{FailureKind, ScrapeOutcome};
use crate::domain::repositories::external_data_repository::ExternalDataRepository;
use crate::domain::repositories::vote_option_repository::VoteOptionRepository;
use crate::utils::errors::RepositoryError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metrics::gauge;
use std::collections::HashMap;
use tracing::{debug, info};

/// 对账时没有任何外部数据的错误信息
pub const NO_EXTERNAL_DATA: &str = "No external data found";
/// 对账时外部数据缺少图片的错误信息
pub const PICTURE_NOT_DOWNLOADED: &str = "Picture not downloaded";

/// 重试台账
///
/// 以投票选项ID为键的并发安全映射，记录尚未完成的抓取工作。
/// 由事件入口和重试调度器共同持有，生命周期与进程相同。
/// 持久化存储才是事实来源，台账可以随时通过 [`RetryLedger::reconcile`] 重建。
#[derive(Debug, Default)]
pub struct RetryLedger {
    entries: DashMap<i64, RetryLedgerEntry>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次失败
    ///
    /// 条目不存在时以计数1插入；存在时计数加一并覆盖错误、分类和时间。
    /// 整个读改写在同一个分片锁内完成，并发上报不会丢失计数。
    ///
    /// # 返回值
    ///
    /// 写入后的条目
    pub fn record_failure(
        &self,
        job: ScrapeJob,
        error: Option<String>,
        kind: FailureKind,
    ) -> RetryLedgerEntry {
        let updated = match self.entries.entry(job.vote_option_id) {
            Entry::Occupied(mut occupied) => {
                let next = occupied.get().next_failure(job, error, kind);
                occupied.insert(next.clone());
                next
            }
            Entry::Vacant(vacant) => {
                let first = RetryLedgerEntry::first_failure(job, error, kind);
                vacant.insert(first.clone());
                first
            }
        };

        debug!(
            "Recorded {} for vote option {} (failures: {})",
            updated.failure_kind, updated.job.vote_option_id, updated.failure_count
        );
        self.publish_size();
        updated
    }

    /// 根据一次执行结果更新台账
    ///
    /// 成功时移除条目；失败时按结果的错误分类记录，
    /// 没有错误信息的失败按整体失败处理。
    ///
    /// # 返回值
    ///
    /// 执行是否成功
    pub fn apply_outcome(&self, job: ScrapeJob, outcome: &ScrapeOutcome) -> bool {
        if outcome.success {
            self.remove(job.vote_option_id);
            return true;
        }

        // A failure without an error has nothing to say about the data, so rescrape it
        let kind = outcome
            .failure_kind()
            .unwrap_or(FailureKind::FullScrapeFailed);
        self.record_failure(job, outcome.error_message(), kind);
        false
    }

    /// 抓取成功后移除条目
    pub fn remove(&self, vote_option_id: i64) -> Option<RetryLedgerEntry> {
        let removed = self.entries.remove(&vote_option_id).map(|(_, entry)| entry);
        if removed.is_some() {
            self.publish_size();
        }
        removed
    }

    pub fn get(&self, vote_option_id: i64) -> Option<RetryLedgerEntry> {
        self.entries.get(&vote_option_id).map(|e| e.value().clone())
    }

    pub fn contains(&self, vote_option_id: i64) -> bool {
        self.entries.contains_key(&vote_option_id)
    }

    /// 当前所有条目的快照，按投票选项ID排序
    pub fn snapshot(&self) -> Vec<RetryLedgerEntry> {
        let mut entries: Vec<RetryLedgerEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| e.job.vote_option_id);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 与持久化存储对账
    ///
    /// 扫描所有带外部链接的投票选项，对尚未在台账中的选项：
    /// 没有外部数据的记为整体失败，有数据但没有图片的记为图片失败。
    /// 已在台账中的条目保持不变，重复调用不会产生重复条目。
    ///
    /// # 返回值
    ///
    /// 新加入台账的条目数量
    pub async fn reconcile(
        &self,
        options: &dyn VoteOptionRepository,
        data: &dyn ExternalDataRepository,
    ) -> Result<usize, RepositoryError> {
        let linked = options.find_with_external_link().await?;
        let untracked: Vec<(i64, String)> = linked
            .into_iter()
            .filter(|(id, _)| !self.contains(*id))
            .collect();
        if untracked.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = untracked.iter().map(|(id, _)| *id).collect();
        let existing: HashMap<i64, bool> = data
            .find_by_option_ids(&ids)
            .await?
            .into_iter()
            .map(|record| (record.vote_option_id, record.has_picture()))
            .collect();

        let mut added = 0;
        for (vote_option_id, url) in untracked {
            let (kind, message) = match existing.get(&vote_option_id) {
                None => (FailureKind::FullScrapeFailed, NO_EXTERNAL_DATA),
                Some(false) => (FailureKind::PictureDownloadFailed, PICTURE_NOT_DOWNLOADED),
                Some(true) => continue,
            };

            // A failure reported while the scan ran takes precedence
            if let Entry::Vacant(vacant) = self.entries.entry(vote_option_id) {
                vacant.insert(RetryLedgerEntry::first_failure(
                    ScrapeJob::new(url, vote_option_id),
                    Some(message.to_string()),
                    kind,
                ));
                added += 1;
            }
        }

        if added > 0 {
            info!("Reconciliation added {} vote options to the retry ledger", added);
            self.publish_size();
        }
        Ok(added)
    }

    /// 台账统计信息，只用于观测
    pub fn statistics(&self) -> LedgerStatistics {
        let mut stats = LedgerStatistics::default();
        let mut total_retries: u64 = 0;

        for entry in self.entries.iter() {
            stats.total_failed += 1;
            stats.max_retries = stats.max_retries.max(entry.failure_count);
            total_retries += u64::from(entry.failure_count);
            match entry.failure_kind {
                FailureKind::FullScrapeFailed => stats.full_scrape_failed += 1,
                FailureKind::PictureDownloadFailed => stats.picture_download_failed += 1,
            }
        }

        if stats.total_failed > 0 {
            stats.avg_retries = total_retries as f64 / stats.total_failed as f64;
        }
        stats
    }

    fn publish_size(&self) {
        gauge!("scrape_retry_ledger_size").set(self.entries.len() as f64);
    }
}

#[cfg(test)]
#[path = "retry_ledger_test.rs"]
mod tests;
