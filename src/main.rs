// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use votecrawl::application::usecases::create_vote_option::CreateVoteOptionUseCase;
use votecrawl::config::settings::Settings;
use votecrawl::domain::services::external_data_service::ExternalDataService;
use votecrawl::domain::services::option_guard::OptionGuard;
use votecrawl::domain::services::scrape_service::ScrapeService;
use votecrawl::engines;
use votecrawl::infrastructure::database::connection;
use votecrawl::infrastructure::metrics;
use votecrawl::infrastructure::repositories::external_data_repo_impl::ExternalDataRepositoryImpl;
use votecrawl::infrastructure::repositories::vote_option_repo_impl::VoteOptionRepositoryImpl;
use votecrawl::presentation::routes::{self, ApiComponents};
use votecrawl::queue::retry_ledger::RetryLedger;
use votecrawl::queue::scrape_queue::ScrapeJobQueue;
use votecrawl::utils::telemetry;
use votecrawl::workers::manager::WorkerManager;
use votecrawl::workers::retry_worker::RetryWorker;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting votecrawl...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database and run migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Initialize components
    let option_repo = Arc::new(VoteOptionRepositoryImpl::new(db.clone()));
    let data_repo = Arc::new(ExternalDataRepositoryImpl::new(db.clone()));

    let router = Arc::new(engines::default_router(&settings.scrape)?);
    info!("Scraping strategies: {:?}", router.names());

    let ledger = Arc::new(RetryLedger::new());
    let service = Arc::new(ScrapeService::new(
        router,
        data_repo.clone(),
        OptionGuard::new(),
    ));
    let (queue, receiver) = ScrapeJobQueue::new(settings.workers.queue_capacity, ledger.clone());

    let retry_worker = Arc::new(RetryWorker::new(
        ledger.clone(),
        service.clone(),
        option_repo.clone(),
        data_repo.clone(),
        settings.retry.policy(),
        settings.retry.concurrency,
        settings.retry.interval(),
    ));

    // 5. Start workers
    let mut worker_manager = WorkerManager::new(
        service,
        ledger,
        retry_worker.clone(),
        settings.workers.max_concurrency,
    );
    worker_manager.start_workers(receiver);

    // 6. Start HTTP server
    let app = routes::app(ApiComponents {
        create_vote_option: Arc::new(CreateVoteOptionUseCase::new(option_repo, queue)),
        external_data: Arc::new(ExternalDataService::new(data_repo)),
        retry_worker,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = worker_manager.wait_for_shutdown() => {}
    }

    worker_manager.shutdown();
    Ok(())
}
