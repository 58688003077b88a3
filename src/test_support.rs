// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的数据库和抓取策略替身

use crate::domain::models::listing::ExtractedRecord;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::vote_option::NewVoteOption;
use crate::domain::repositories::vote_option_repository::VoteOptionRepository;
use crate::engines::traits::ListingScraper;
use crate::infrastructure::repositories::external_data_repo_impl::ExternalDataRepositoryImpl;
use crate::infrastructure::repositories::vote_option_repo_impl::VoteOptionRepositoryImpl;
use crate::utils::url_utils::host_matches;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub struct TestRepos {
    pub db: Arc<DatabaseConnection>,
    pub options: Arc<VoteOptionRepositoryImpl>,
    pub data: Arc<ExternalDataRepositoryImpl>,
}

pub async fn setup_repos() -> TestRepos {
    let db = setup_db().await;
    TestRepos {
        options: Arc::new(VoteOptionRepositoryImpl::new(db.clone())),
        data: Arc::new(ExternalDataRepositoryImpl::new(db.clone())),
        db,
    }
}

/// 创建一个带外部链接的投票选项，返回选项ID
pub async fn seed_option(repo: &dyn VoteOptionRepository, link: Option<&str>) -> i64 {
    let data = link.map(|l| serde_json::json!({ "externalLink": l }));
    repo.create(&NewVoteOption {
        vote_id: 1,
        label: "Option".to_string(),
        data,
    })
    .await
    .unwrap()
    .id
}

pub fn cabin_a() -> ExtractedRecord {
    ExtractedRecord {
        name: "Cabin A".to_string(),
        picture_url: "http://x/y.png".to_string(),
        star_rating: 4.5,
        review_count: 12,
    }
}

/// 可配置的抓取策略替身
///
/// 认领指定域名；提取返回固定记录，图片写入临时目录
pub struct FakeScraper {
    domain: &'static str,
    record: ExtractedRecord,
    picture_dir: PathBuf,
    failing_urls: Mutex<HashSet<String>>,
    failing_pictures: Mutex<HashSet<i64>>,
    pub extract_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
}

impl FakeScraper {
    pub fn new(domain: &'static str, picture_dir: PathBuf) -> Self {
        Self {
            domain,
            record: cabin_a(),
            picture_dir,
            failing_urls: Mutex::new(HashSet::new()),
            failing_pictures: Mutex::new(HashSet::new()),
            extract_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_extract(&self, url: &str, failing: bool) {
        let mut urls = self.failing_urls.lock().unwrap();
        if failing {
            urls.insert(url.to_string());
        } else {
            urls.remove(url);
        }
    }

    pub fn fail_picture(&self, vote_option_id: i64, failing: bool) {
        let mut ids = self.failing_pictures.lock().unwrap();
        if failing {
            ids.insert(vote_option_id);
        } else {
            ids.remove(&vote_option_id);
        }
    }

    pub fn extract_count(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn image_count(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingScraper for FakeScraper {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, self.domain)
    }

    async fn extract(&self, job: &ScrapeJob) -> Option<ExtractedRecord> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_urls.lock().unwrap().contains(&job.target_url) {
            return None;
        }
        Some(self.record.clone())
    }

    async fn fetch_image(&self, vote_option_id: i64, _picture_url: &str) -> Option<PathBuf> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_pictures.lock().unwrap().contains(&vote_option_id) {
            return None;
        }
        std::fs::create_dir_all(&self.picture_dir).ok()?;
        let path = self
            .picture_dir
            .join(format!("property_{}.png", vote_option_id));
        std::fs::write(&path, b"png").ok()?;
        Some(path)
    }
}
