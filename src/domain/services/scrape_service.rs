// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ExternalDataRecord;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::scrape_outcome::{ScrapeError, ScrapeOutcome};
use crate::domain::repositories::external_data_repository::ExternalDataRepository;
use crate::domain::services::option_guard::OptionGuard;
use crate::engines::router::ScraperRouter;
use crate::utils::errors::RepositoryError;
use metrics::counter;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

fn storage_error(e: RepositoryError) -> ScrapeError {
    ScrapeError::Storage(e.to_string())
}

/// 抓取执行服务
///
/// 选择策略、提取数据、下载图片并持久化结果。
/// 所有失败都转换为 [`ScrapeOutcome`]，不会向调用方抛出错误。
pub struct ScrapeService {
    router: Arc<ScraperRouter>,
    repo: Arc<dyn ExternalDataRepository>,
    guard: OptionGuard,
}

impl ScrapeService {
    /// 创建新的抓取执行服务
    ///
    /// # 参数
    ///
    /// * `router` - 策略路由器
    /// * `repo` - 外部数据仓库
    /// * `guard` - 投票选项互斥锁，同一选项的尝试会排队执行
    pub fn new(
        router: Arc<ScraperRouter>,
        repo: Arc<dyn ExternalDataRepository>,
        guard: OptionGuard,
    ) -> Self {
        Self {
            router,
            repo,
            guard,
        }
    }

    /// 执行完整抓取
    ///
    /// 图片下载失败时数据仍会保存，返回的失败结果归类为图片失败；
    /// 已经有图片的选项保留原有图片引用并视为成功
    #[instrument(skip(self, job), fields(vote_option_id = job.vote_option_id, url = %job.target_url))]
    pub async fn execute(&self, job: &ScrapeJob) -> ScrapeOutcome {
        let _lock = self.guard.acquire(job.vote_option_id).await;

        let outcome = match self.scrape(job).await {
            Ok(()) => {
                info!("Scrape completed");
                ScrapeOutcome::success()
            }
            Err(e) => {
                warn!("Scrape failed: {}", e);
                ScrapeOutcome::failure(e)
            }
        };
        record_outcome("execute", &outcome);
        outcome
    }

    async fn scrape(&self, job: &ScrapeJob) -> Result<(), ScrapeError> {
        let scraper = self
            .router
            .resolve(&job.target_url)
            .ok_or(ScrapeError::NoStrategyAvailable)?;

        let record = scraper
            .extract(job)
            .await
            .ok_or(ScrapeError::ExtractionFailed)?;

        let picture = if record.picture_url.is_empty() {
            warn!("Extracted listing has no picture URL");
            None
        } else {
            scraper
                .fetch_image(job.vote_option_id, &record.picture_url)
                .await
        };

        let previous = self
            .repo
            .find_by_option_id(job.vote_option_id)
            .await
            .map_err(storage_error)?
            .and_then(|existing| existing.picture_local_id);

        let picture_local_id = match &picture {
            Some(path) => Some(self.store_picture(path, previous).await?),
            None => {
                if previous.is_some() {
                    warn!("Picture download failed, keeping the previously stored picture");
                }
                previous
            }
        };

        let data = ExternalDataRecord::from_extracted(
            job.vote_option_id,
            &job.target_url,
            &record,
            picture_local_id,
        );
        self.repo.upsert(&data).await.map_err(|e| {
            error!("Failed to save external data: {}", e);
            storage_error(e)
        })?;

        if picture_local_id.is_none() {
            return Err(ScrapeError::PictureDownloadFailed);
        }
        Ok(())
    }

    /// 只重试图片下载
    ///
    /// 已有图片时直接返回成功；否则按保存的来源地址重新选择策略，
    /// 下载成功后原地更新外部数据的图片引用。
    #[instrument(skip(self))]
    pub async fn retry_picture(&self, vote_option_id: i64) -> ScrapeOutcome {
        let _lock = self.guard.acquire(vote_option_id).await;

        let outcome = match self.refetch_picture(vote_option_id).await {
            Ok(()) => ScrapeOutcome::success(),
            Err(e) => {
                warn!("Picture retry failed: {}", e);
                ScrapeOutcome::failure(e)
            }
        };
        record_outcome("retry_picture", &outcome);
        outcome
    }

    async fn refetch_picture(&self, vote_option_id: i64) -> Result<(), ScrapeError> {
        let record = self
            .repo
            .find_by_option_id(vote_option_id)
            .await
            .map_err(storage_error)?
            .ok_or(ScrapeError::MissingExternalData(vote_option_id))?;

        if record.has_picture() {
            info!("Picture already downloaded, nothing to do");
            return Ok(());
        }

        let scraper = self
            .router
            .resolve(&record.source_url)
            .ok_or(ScrapeError::NoStrategyAvailable)?;

        if record.picture_url.is_empty() {
            return Err(ScrapeError::PictureDownloadFailed);
        }
        let path = scraper
            .fetch_image(vote_option_id, &record.picture_url)
            .await
            .ok_or(ScrapeError::PictureDownloadFailed)?;

        let picture_id = self.store_picture(&path, None).await?;
        self.repo
            .update_picture_ref(vote_option_id, picture_id)
            .await
            .map_err(storage_error)?;

        info!("Picture downloaded on retry: {}", path.display());
        Ok(())
    }

    /// 释放空闲的选项锁
    pub fn prune_locks(&self) -> usize {
        self.guard.prune()
    }

    /// 保存图片引用，路径未变时复用已有记录
    async fn store_picture(&self, path: &Path, previous: Option<i64>) -> Result<i64, ScrapeError> {
        let local_path = path.to_string_lossy();
        if let Some(id) = previous {
            let stored = self
                .repo
                .find_local_picture(id)
                .await
                .map_err(storage_error)?;
            if stored.is_some_and(|picture| picture.local_path == local_path) {
                return Ok(id);
            }
        }

        self.repo
            .insert_local_picture(&local_path)
            .await
            .map_err(|e| {
                error!("Failed to save picture reference: {}", e);
                storage_error(e)
            })
    }
}

fn record_outcome(operation: &'static str, outcome: &ScrapeOutcome) {
    let result = match &outcome.error {
        None => "success",
        Some(e) => e.label(),
    };
    counter!("scrape_jobs_total", "operation" => operation, "outcome" => result).increment(1);
}

#[cfg(test)]
#[path = "scrape_service_test.rs"]
mod tests;
