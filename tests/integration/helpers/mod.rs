// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::{TestResponse, TestServer};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use votecrawl::application::usecases::create_vote_option::CreateVoteOptionUseCase;
use votecrawl::config::settings::Settings;
use votecrawl::domain::services::external_data_service::ExternalDataService;
use votecrawl::domain::services::option_guard::OptionGuard;
use votecrawl::domain::services::scrape_service::ScrapeService;
use votecrawl::engines;
use votecrawl::infrastructure::repositories::external_data_repo_impl::ExternalDataRepositoryImpl;
use votecrawl::infrastructure::repositories::vote_option_repo_impl::VoteOptionRepositoryImpl;
use votecrawl::presentation::routes::{self, ApiComponents};
use votecrawl::queue::retry_ledger::RetryLedger;
use votecrawl::queue::scrape_queue::ScrapeJobQueue;
use votecrawl::utils::retry_policy::RetryPolicy;
use votecrawl::workers::retry_worker::RetryWorker;
use votecrawl::workers::scrape_worker::ScrapeWorker;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PICTURE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlakeside";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub ledger: Arc<RetryLedger>,
    /// 模拟的房源站点，Open Graph 策略认领它的地址
    pub site: MockServer,
    _download_dir: tempfile::TempDir,
}

impl TestApp {
    /// 模拟站点上的页面地址
    pub fn listing_url(&self, name: &str) -> String {
        format!("{}/listing/{}", self.site.uri(), name)
    }

    /// 在模拟站点上挂载一个带 Open Graph 标签的房源页面
    pub async fn mount_listing(&self, name: &str, title: &str) {
        let body = format!(
            r#"<html><head>
<title>ignored</title>
<meta property="og:title" content="{title}">
<meta property="og:image" content="/images/{name}.png">
<script type="application/ld+json">
{{"@type":"VacationRental","aggregateRating":{{"ratingValue":"4.8","reviewCount":"31"}}}}
</script>
</head><body></body></html>"#
        );
        Mock::given(method("GET"))
            .and(path(format!("/listing/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.site)
            .await;
    }

    /// 挂载房源图片
    pub async fn mount_picture(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/images/{}.png", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(PICTURE_BYTES),
            )
            .mount(&self.site)
            .await;
    }

    /// 创建投票选项，返回响应体
    pub async fn create_option(&self, vote_id: i64, body: serde_json::Value) -> TestResponse {
        self.server
            .post(&format!("/v1/votes/{}/options", vote_id))
            .json(&body)
            .await
    }
}

pub async fn create_test_app() -> TestApp {
    let site = MockServer::start().await;
    let download_dir = tempfile::tempdir().unwrap();

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();

    let mut settings = Settings::defaults().unwrap();
    settings.scrape.download_folder = download_dir.path().to_string_lossy().to_string();
    settings.scrape.block_private_hosts = false;
    settings.scrape.request_timeout_secs = 5;
    settings.scrape.open_graph_domains = vec!["127.0.0.1".to_string()];

    let option_repo = Arc::new(VoteOptionRepositoryImpl::new(db.clone()));
    let data_repo = Arc::new(ExternalDataRepositoryImpl::new(db.clone()));
    let router = Arc::new(engines::default_router(&settings.scrape).unwrap());

    let ledger = Arc::new(RetryLedger::new());
    let service = Arc::new(ScrapeService::new(
        router,
        data_repo.clone(),
        OptionGuard::new(),
    ));
    let (queue, receiver) = ScrapeJobQueue::new(16, ledger.clone());

    let worker = ScrapeWorker::new(service.clone(), ledger.clone(), 4);
    tokio::spawn(async move {
        worker.run(receiver).await;
    });

    // The timer is not started; cycles are driven through the API
    let retry_worker = Arc::new(RetryWorker::new(
        ledger.clone(),
        service,
        option_repo.clone(),
        data_repo.clone(),
        RetryPolicy::default(),
        2,
        Duration::from_secs(300),
    ));

    let app = routes::app(ApiComponents {
        create_vote_option: Arc::new(CreateVoteOptionUseCase::new(option_repo, queue)),
        external_data: Arc::new(ExternalDataService::new(data_repo)),
        retry_worker,
    });

    TestApp {
        server: TestServer::new(app).unwrap(),
        db,
        ledger,
        site,
        _download_dir: download_dir,
    }
}

/// 轮询直到条件成立，超时返回 false
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
