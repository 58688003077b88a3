// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::scrape_outcome::FailureKind;
use crate::queue::retry_ledger::RetryLedger;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// 抓取任务接收端，由抓取工作池消费
pub type ScrapeJobReceiver = mpsc::Receiver<ScrapeJob>;

/// 事件入口
///
/// 投票选项创建时把抓取任务放入有界通道后立即返回，调用方永远不会等待抓取。
/// 通道已满或已关闭时任务记入重试台账，由重试调度器稍后处理。
#[derive(Clone)]
pub struct ScrapeJobQueue {
    sender: mpsc::Sender<ScrapeJob>,
    ledger: Arc<RetryLedger>,
}

impl ScrapeJobQueue {
    /// 创建事件入口及对应的接收端
    ///
    /// # 参数
    ///
    /// * `capacity` - 等待队列容量
    /// * `ledger` - 重试台账
    pub fn new(capacity: usize, ledger: Arc<RetryLedger>) -> (Self, ScrapeJobReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, ledger }, receiver)
    }

    /// 发布抓取任务（不阻塞、不失败）
    ///
    /// # 返回值
    ///
    /// 任务进入队列时返回 true，转入重试台账时返回 false
    pub fn publish(&self, job: ScrapeJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => {
                counter!("scrape_intake_total", "result" => "queued").increment(1);
                debug!("Scrape job queued");
                true
            }
            Err(TrySendError::Full(job)) => {
                warn!(
                    "Scrape queue full, deferring vote option {} to the retry ledger",
                    job.vote_option_id
                );
                counter!("scrape_intake_total", "result" => "deferred").increment(1);
                self.ledger.record_failure(
                    job,
                    Some("Scrape queue full".to_string()),
                    FailureKind::FullScrapeFailed,
                );
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(
                    "Scrape queue closed, deferring vote option {} to the retry ledger",
                    job.vote_option_id
                );
                counter!("scrape_intake_total", "result" => "deferred").increment(1);
                self.ledger.record_failure(
                    job,
                    Some("Scrape queue closed".to_string()),
                    FailureKind::FullScrapeFailed,
                );
                false
            }
        }
    }
}
