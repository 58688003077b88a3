// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::scrape_outcome::FailureKind;
use crate::domain::services::scrape_service::ScrapeService;
use crate::queue::retry_ledger::RetryLedger;
use crate::queue::scrape_queue::ScrapeJobReceiver;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

/// 抓取工作池
///
/// 消费事件入口的任务通道，用信号量限制同时执行的任务数。
/// 每个任务独立运行，失败（包括 panic）都会被捕获并写入重试台账。
pub struct ScrapeWorker {
    service: Arc<ScrapeService>,
    ledger: Arc<RetryLedger>,
    max_concurrency: usize,
}

impl ScrapeWorker {
    /// 创建新的抓取工作池
    ///
    /// # 参数
    ///
    /// * `service` - 抓取执行服务
    /// * `ledger` - 重试台账
    /// * `max_concurrency` - 同时执行的任务上限
    pub fn new(service: Arc<ScrapeService>, ledger: Arc<RetryLedger>, max_concurrency: usize) -> Self {
        Self {
            service,
            ledger,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 运行工作池，直到任务通道关闭
    pub async fn run(&self, mut receiver: ScrapeJobReceiver) {
        info!(
            "Scrape worker pool started with {} slots",
            self.max_concurrency
        );
        let slots = Arc::new(Semaphore::new(self.max_concurrency));

        while let Some(job) = receiver.recv().await {
            let permit = match slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let service = self.service.clone();
            let ledger = self.ledger.clone();
            tokio::spawn(async move {
                process_job(service, ledger, job).await;
                drop(permit);
            });
        }

        info!("Scrape job channel closed, worker pool stopping");
    }
}

/// 执行单个任务并根据结果更新台账
#[instrument(skip(service, ledger, job), fields(vote_option_id = job.vote_option_id))]
pub async fn process_job(service: Arc<ScrapeService>, ledger: Arc<RetryLedger>, job: ScrapeJob) {
    let attempt = {
        let job = job.clone();
        tokio::spawn(async move { service.execute(&job).await })
    };

    match attempt.await {
        Ok(outcome) => {
            ledger.apply_outcome(job, &outcome);
        }
        Err(e) => {
            error!("Scrape job aborted: {}", e);
            ledger.record_failure(
                job,
                Some(format!("Scrape job aborted: {}", e)),
                FailureKind::FullScrapeFailed,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::option_guard::OptionGuard;
    use crate::engines::router::ScraperRouter;
    use crate::queue::scrape_queue::ScrapeJobQueue;
    use crate::test_support::{seed_option, setup_repos, FakeScraper};
    use std::time::Duration;

    #[tokio::test]
    async fn test_pool_processes_published_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let repos = setup_repos().await;
        let scraper = Arc::new(FakeScraper::new("example-rentals.com", dir.path().to_path_buf()));
        let service = Arc::new(ScrapeService::new(
            Arc::new(ScraperRouter::new(vec![scraper.clone()])),
            repos.data.clone(),
            OptionGuard::new(),
        ));
        let ledger = Arc::new(RetryLedger::new());
        let (queue, receiver) = ScrapeJobQueue::new(8, ledger.clone());

        let ok = seed_option(repos.options.as_ref(), Some("https://example-rentals.com/ok")).await;
        let no_picture =
            seed_option(repos.options.as_ref(), Some("https://example-rentals.com/np")).await;
        scraper.fail_picture(no_picture, true);

        let worker = ScrapeWorker::new(service, ledger.clone(), 2);
        let pool = tokio::spawn(async move { worker.run(receiver).await });

        queue.publish(ScrapeJob::new("https://example-rentals.com/ok", ok));
        queue.publish(ScrapeJob::new("https://example-rentals.com/np", no_picture));
        queue.publish(ScrapeJob::new("https://unknown-host.test/x", 999));

        // completion is only observable through side effects
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while ledger.len() < 2 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(!ledger.contains(ok));
        assert_eq!(
            ledger.get(no_picture).unwrap().failure_kind,
            FailureKind::PictureDownloadFailed
        );
        assert_eq!(
            ledger.get(999).unwrap().last_error.as_deref(),
            Some("No scraper available for this URL")
        );

        drop(queue);
        tokio::time::timeout(Duration::from_secs(1), pool)
            .await
            .unwrap()
            .unwrap();
    }
}
