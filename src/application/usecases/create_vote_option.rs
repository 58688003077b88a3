// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::vote_option_request::CreateVoteOptionDto;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::models::vote_option::{NewVoteOption, VoteOption};
use crate::domain::repositories::vote_option_repository::VoteOptionRepository;
use crate::queue::scrape_queue::ScrapeJobQueue;
use crate::utils::errors::RepositoryError;

/// 创建投票选项用例
///
/// 先持久化选项，再把带外部链接的选项投递给抓取工作池。
/// 投递不会阻塞也不会失败：队列已满时任务直接进入重试台账。
pub struct CreateVoteOptionUseCase {
    options: Arc<dyn VoteOptionRepository>,
    queue: ScrapeJobQueue,
}

impl CreateVoteOptionUseCase {
    pub fn new(options: Arc<dyn VoteOptionRepository>, queue: ScrapeJobQueue) -> Self {
        Self { options, queue }
    }

    pub async fn execute(
        &self,
        vote_id: i64,
        dto: CreateVoteOptionDto,
    ) -> Result<VoteOption, RepositoryError> {
        let option = self
            .options
            .create(&NewVoteOption {
                vote_id,
                label: dto.label.trim().to_string(),
                data: dto.option_data(),
            })
            .await?;

        if let Some(link) = option.external_link() {
            let job = ScrapeJob::new(link, option.id);
            if self.queue.publish(job) {
                info!("Queued scrape for vote option {}", option.id);
            } else {
                warn!(
                    "Scrape for vote option {} deferred to the retry ledger",
                    option.id
                );
            }
        }

        Ok(option)
    }
}
