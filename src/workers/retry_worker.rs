// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::retry_entry::{LedgerStatistics, RetryLedgerEntry};
use crate::domain::models::scrape_outcome::FailureKind;
use crate::domain::repositories::external_data_repository::ExternalDataRepository;
use crate::domain::repositories::vote_option_repository::VoteOptionRepository;
use crate::domain::services::scrape_service::ScrapeService;
use crate::queue::retry_ledger::RetryLedger;
use crate::utils::retry_policy::RetryPolicy;
use chrono::Utc;
use futures::StreamExt;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 一次重试周期的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryCycleReport {
    /// 对账新增的条目数
    pub reconciled: usize,
    /// 本周期实际重试的条目数
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 超过最大重试次数而跳过的条目数
    pub parked: usize,
    /// 退避时间未到而跳过的条目数
    pub not_due: usize,
    /// 周期结束后台账中剩余的条目数
    pub remaining: usize,
    /// 对账失败时的错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile_error: Option<String>,
}

/// 重试统计信息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryStatistics {
    #[serde(flatten)]
    pub ledger: LedgerStatistics,
    pub parked: usize,
    pub entries: Vec<RetryLedgerEntry>,
}

/// 重试调度器
///
/// 按固定周期对账并重试台账中的条目：图片失败只重试图片，整体失败重新抓取。
/// 定时触发和手动触发共用一把周期锁，周期之间永不重叠。
pub struct RetryWorker {
    ledger: Arc<RetryLedger>,
    service: Arc<ScrapeService>,
    options: Arc<dyn VoteOptionRepository>,
    data: Arc<dyn ExternalDataRepository>,
    policy: RetryPolicy,
    concurrency: usize,
    period: Duration,
    cycle_lock: Mutex<()>,
}

impl RetryWorker {
    /// 创建新的重试调度器
    ///
    /// # 参数
    ///
    /// * `ledger` - 重试台账
    /// * `service` - 抓取执行服务
    /// * `options` - 投票选项仓库（对账用）
    /// * `data` - 外部数据仓库（对账用）
    /// * `policy` - 重试次数与退避策略
    /// * `concurrency` - 单个周期内的并发重试数
    /// * `period` - 周期
    pub fn new(
        ledger: Arc<RetryLedger>,
        service: Arc<ScrapeService>,
        options: Arc<dyn VoteOptionRepository>,
        data: Arc<dyn ExternalDataRepository>,
        policy: RetryPolicy,
        concurrency: usize,
        period: Duration,
    ) -> Self {
        Self {
            ledger,
            service,
            options,
            data,
            policy,
            concurrency: concurrency.max(1),
            period: period.max(Duration::from_secs(1)),
            cycle_lock: Mutex::new(()),
        }
    }

    /// 启动定时重试
    ///
    /// 第一次周期在启动时立即执行，用于从持久化存储重建台账
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Retry worker started, period {:?}", self.period);

            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// 执行一次重试周期
    ///
    /// 已有周期在运行时等待其结束后再执行
    pub async fn run_cycle(&self) -> RetryCycleReport {
        let _cycle = self.cycle_lock.lock().await;
        counter!("scrape_retry_cycles_total").increment(1);

        let mut report = RetryCycleReport::default();
        match self
            .ledger
            .reconcile(self.options.as_ref(), self.data.as_ref())
            .await
        {
            Ok(added) => report.reconciled = added,
            Err(e) => {
                error!("Reconciliation failed: {}", e);
                report.reconcile_error = Some(e.to_string());
            }
        }

        let snapshot = self.ledger.snapshot();
        if snapshot.is_empty() {
            debug!("Retry ledger is empty, nothing to do");
            return report;
        }

        let now = Utc::now();
        let mut due = Vec::new();
        for entry in snapshot {
            if !self.policy.should_retry(entry.failure_count) {
                report.parked += 1;
            } else if !self
                .policy
                .is_due(entry.failure_count, entry.last_attempt, now)
            {
                report.not_due += 1;
            } else {
                due.push(entry);
            }
        }

        report.attempted = due.len();
        info!(
            "Retrying {} vote options ({} parked, {} waiting for backoff)",
            report.attempted, report.parked, report.not_due
        );

        let results: Vec<bool> = futures::stream::iter(due)
            .map(|entry| self.retry_entry(entry))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        report.succeeded = results.iter().filter(|ok| **ok).count();
        report.failed = results.len() - report.succeeded;
        report.remaining = self.ledger.len();
        self.service.prune_locks();

        let stats = self.ledger.statistics();
        info!(
            "Retry cycle finished: {} succeeded, {} failed; ledger has {} entries (max retries {}, avg {:.2})",
            report.succeeded, report.failed, stats.total_failed, stats.max_retries, stats.avg_retries
        );
        report
    }

    async fn retry_entry(&self, entry: RetryLedgerEntry) -> bool {
        let service = self.service.clone();
        let vote_option_id = entry.job.vote_option_id;

        // Each attempt runs in its own task so a panic cannot abort the batch
        let attempt = match entry.failure_kind {
            FailureKind::PictureDownloadFailed => {
                tokio::spawn(async move { service.retry_picture(vote_option_id).await })
            }
            FailureKind::FullScrapeFailed => {
                let job = entry.job.clone();
                tokio::spawn(async move { service.execute(&job).await })
            }
        };

        match attempt.await {
            Ok(outcome) => {
                let result = if outcome.success { "success" } else { "failure" };
                counter!("scrape_retry_attempts_total", "kind" => entry.failure_kind.to_string(), "result" => result)
                    .increment(1);
                if !outcome.success {
                    warn!(
                        "Retry for vote option {} failed: {}",
                        vote_option_id,
                        outcome.error_message().unwrap_or_default()
                    );
                }
                self.ledger.apply_outcome(entry.job, &outcome)
            }
            Err(e) => {
                error!("Retry for vote option {} aborted: {}", vote_option_id, e);
                counter!("scrape_retry_attempts_total", "kind" => entry.failure_kind.to_string(), "result" => "aborted")
                    .increment(1);
                self.ledger.record_failure(
                    entry.job,
                    Some(format!("Retry aborted: {}", e)),
                    entry.failure_kind,
                );
                false
            }
        }
    }

    /// 台账统计信息和当前条目
    pub fn statistics(&self) -> RetryStatistics {
        let entries = self.ledger.snapshot();
        let parked = entries
            .iter()
            .filter(|e| !self.policy.should_retry(e.failure_count))
            .count();
        RetryStatistics {
            ledger: self.ledger.statistics(),
            parked,
            entries,
        }
    }
}

#[cfg(test)]
#[path = "retry_worker_test.rs"]
mod tests;
