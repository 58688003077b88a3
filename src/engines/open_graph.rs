// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{ExtractedRecord, UNKNOWN_LISTING_NAME};
use crate::domain::models::scrape_job::ScrapeJob;
use crate::engines::html;
use crate::engines::http_client::HttpFetcher;
use crate::engines::traits::ListingScraper;
use crate::utils::url_utils::{host_matches, resolve_against};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use scraper::Html;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// 通用 Open Graph 抓取策略
///
/// 用于配置中列出的、没有专用解析器的站点
pub struct OpenGraphScraper {
    fetcher: Arc<HttpFetcher>,
    domains: Vec<String>,
}

impl OpenGraphScraper {
    /// 创建新的 Open Graph 策略
    ///
    /// # 参数
    ///
    /// * `fetcher` - 共享HTTP客户端
    /// * `domains` - 认领的域名列表，规则与 `host_matches` 相同
    pub fn new(fetcher: Arc<HttpFetcher>, domains: Vec<String>) -> Self {
        Self { fetcher, domains }
    }
}

/// 从页面的 Open Graph 标签和 JSON-LD 中解析房源数据
///
/// 既没有标题也没有图片时返回 None
pub fn parse_listing(page: &str, page_url: &str) -> Option<ExtractedRecord> {
    let doc = Html::parse_document(page);
    let json_ld = html::json_ld_listing(&doc).unwrap_or_default();

    let name = html::meta_content(&doc, "og:title")
        .or(json_ld.name)
        .or_else(|| html::first_text(&doc, "title"));
    let picture = html::meta_content(&doc, "og:image").or(json_ld.image);

    if name.is_none() && picture.is_none() {
        return None;
    }

    Some(ExtractedRecord {
        name: name.unwrap_or_else(|| UNKNOWN_LISTING_NAME.to_string()),
        picture_url: picture
            .map(|src| resolve_against(page_url, &src))
            .unwrap_or_default(),
        star_rating: json_ld.rating.unwrap_or(0.0),
        review_count: json_ld.review_count.unwrap_or(0),
    })
}

#[async_trait]
impl ListingScraper for OpenGraphScraper {
    fn name(&self) -> &'static str {
        "open_graph"
    }

    fn can_handle(&self, url: &str) -> bool {
        self.domains.iter().any(|domain| host_matches(url, domain))
    }

    #[instrument(skip(self, job), fields(vote_option_id = job.vote_option_id, url = %job.target_url))]
    async fn extract(&self, job: &ScrapeJob) -> Option<ExtractedRecord> {
        let page = match self
            .fetcher
            .fetch_page(&job.target_url, HeaderMap::new())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                e.report("Error fetching page");
                return None;
            }
        };

        let record = parse_listing(&page, &job.target_url)?;
        info!(
            "Extracted Open Graph listing: name={}, rating={}, reviews={}",
            record.name, record.star_rating, record.review_count
        );
        Some(record)
    }

    async fn fetch_image(&self, vote_option_id: i64, picture_url: &str) -> Option<PathBuf> {
        let dest = self.fetcher.picture_path(vote_option_id);
        match self
            .fetcher
            .download_image(picture_url, &dest, HeaderMap::new())
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                e.report(&format!(
                    "Error downloading picture for vote option {}",
                    vote_option_id
                ));
                None
            }
        }
    }
}
