// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::scrape_service::ScrapeService;
use crate::queue::retry_ledger::RetryLedger;
use crate::queue::scrape_queue::ScrapeJobReceiver;
use crate::workers::retry_worker::RetryWorker;
use crate::workers::scrape_worker::ScrapeWorker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 负责启动抓取工作池和重试调度器，并在关闭时统一终止
pub struct WorkerManager {
    service: Arc<ScrapeService>,
    ledger: Arc<RetryLedger>,
    retry_worker: Arc<RetryWorker>,
    max_concurrency: usize,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        service: Arc<ScrapeService>,
        ledger: Arc<RetryLedger>,
        retry_worker: Arc<RetryWorker>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            service,
            ledger,
            retry_worker,
            max_concurrency,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// # 参数
    ///
    /// * `receiver` - 事件入口的任务通道接收端
    pub fn start_workers(&mut self, receiver: ScrapeJobReceiver) {
        let worker = ScrapeWorker::new(
            self.service.clone(),
            self.ledger.clone(),
            self.max_concurrency,
        );
        self.handles.push(tokio::spawn(async move {
            worker.run(receiver).await;
        }));

        self.handles.push(self.retry_worker.clone().start());
        info!("Started scrape worker pool and retry scheduler");
    }

    /// 正在运行的后台任务数
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// 终止所有后台任务
    ///
    /// 正在执行的抓取会被中断，未完成的工作由下一次启动时的对账恢复
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
    }
}
