// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{ExtractedRecord, UNKNOWN_LISTING_NAME};
use crate::domain::models::scrape_job::ScrapeJob;
use crate::engines::html;
use crate::engines::http_client::HttpFetcher;
use crate::engines::traits::ListingScraper;
use crate::utils::url_utils::host_matches;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use scraper::Html;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

static STAY_EMBED_DATA: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(\{"__typename":"StayEmbedData"[^}]+\})"#).ok());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StayEmbedData {
    name: String,
    picture_url: String,
    #[serde(default)]
    star_rating: Option<f64>,
    #[serde(default)]
    review_count: Option<i32>,
}

/// Airbnb 房源抓取策略
///
/// 房源数据嵌在页面脚本的 `StayEmbedData` 对象中，找不到时退回 JSON-LD
pub struct AirbnbScraper {
    fetcher: Arc<HttpFetcher>,
}

impl AirbnbScraper {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self { fetcher }
    }
}

/// 从 Airbnb 页面中解析房源数据
///
/// # 返回值
///
/// 脚本和 JSON-LD 都没有房源信息时返回 None
pub fn parse_listing(page: &str) -> Option<ExtractedRecord> {
    let doc = Html::parse_document(page);

    if let Some(regex) = STAY_EMBED_DATA.as_ref() {
        for script in html::script_contents(&doc) {
            if !script.contains("\"__typename\":\"StayEmbedData\"") {
                continue;
            }
            let Some(found) = regex.find(&script) else {
                continue;
            };
            match serde_json::from_str::<StayEmbedData>(found.as_str()) {
                Ok(data) => {
                    return Some(ExtractedRecord {
                        name: data.name,
                        picture_url: data.picture_url,
                        star_rating: data.star_rating.unwrap_or(0.0),
                        review_count: data.review_count.unwrap_or(0),
                    })
                }
                Err(e) => warn!("Malformed StayEmbedData payload: {}", e),
            }
        }
    }

    let listing = html::json_ld_listing(&doc)?;
    Some(ExtractedRecord {
        name: listing
            .name
            .unwrap_or_else(|| UNKNOWN_LISTING_NAME.to_string()),
        picture_url: listing
            .image
            .or_else(|| html::meta_content(&doc, "og:image"))
            .unwrap_or_default(),
        star_rating: listing.rating.unwrap_or(0.0),
        review_count: listing.review_count.unwrap_or(0),
    })
}

#[async_trait]
impl ListingScraper for AirbnbScraper {
    fn name(&self) -> &'static str {
        "airbnb"
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "airbnb.com") || host_matches(url, "airbnb.")
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
                e.report("Error fetching Airbnb page");
                return None;
            }
        };

        let record = parse_listing(&page);
        match &record {
            Some(r) => info!(
                "Extracted Airbnb listing: name={}, rating={}, reviews={}",
                r.name, r.star_rating, r.review_count
            ),
            None => warn!("No StayEmbedData or JSON-LD listing found"),
        }
        record
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
                    "Error downloading Airbnb picture for vote option {}",
                    vote_option_id
                ));
                None
            }
        }
    }
}
