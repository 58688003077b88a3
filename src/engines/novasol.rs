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
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// "4.5 out of 5 stars" / "4,5 von 5 Sternen"
static OUT_OF_FIVE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s+(?:out of|von)\s+5").ok());

static REVIEWS_IN_TEXT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+reviews?").ok());

const IMAGE_REFERER: &str = "https://www.novasol.at/";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Novasol 房源抓取策略
///
/// 页面结构经常变化，每个字段都有独立的选择器回退链，
/// 全部失败时使用默认值而不是放弃整条记录。
pub struct NovasolScraper {
    fetcher: Arc<HttpFetcher>,
}

impl NovasolScraper {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self { fetcher }
    }
}

fn rating_from_label(label: &str) -> Option<f64> {
    OUT_OF_FIVE
        .as_ref()?
        .captures(label)?
        .get(1)?
        .as_str()
        .replace(',', ".")
        .parse()
        .ok()
}

fn extract_name(doc: &Html) -> String {
    html::first_text(doc, "h1")
        .or_else(|| {
            warn!("Could not find h1, trying title");
            html::first_text(doc, "title")
        })
        .unwrap_or_else(|| UNKNOWN_LISTING_NAME.to_string())
}

fn extract_picture(doc: &Html, page_url: &str) -> String {
    let picture = html::first_attr(
        doc,
        "[data-testid='hero-carousel-responsive-gallery'] img",
        "src",
    )
    .or_else(|| {
        debug!("No hero carousel image, trying data-src");
        html::first_attr(doc, "img[data-src]", "data-src")
    })
    .or_else(|| {
        html::first_attr(
            doc,
            ".gallery img, .property-image img, img[alt*='property']",
            "src",
        )
    })
    .or_else(|| {
        warn!("Using first image as fallback");
        html::first_attr(doc, "img", "src")
    });

    match picture {
        Some(src) => resolve_against(page_url, &src),
        None => String::new(),
    }
}

fn extract_rating(doc: &Html) -> f64 {
    html::first_attr(doc, "[data-testid='star-rating']", "aria-label")
        .and_then(|label| rating_from_label(&label))
        .or_else(|| {
            debug!("star-rating aria-label missing, trying score text");
            html::first_text(doc, ".top-line-stars-score-text")
                .and_then(|text| text.replace(',', ".").parse().ok())
        })
        .or_else(|| {
            let selector = Selector::parse("[aria-label*='rating']").ok()?;
            let label = doc.select(&selector).next()?.value().attr("aria-label")?;
            rating_from_label(label)
        })
        .or_else(|| {
            html::first_text(doc, ".rating, [class*='rating'], [itemprop='ratingValue']")
                .and_then(|text| html::digits_f64(&text))
        })
        .unwrap_or_else(|| {
            warn!("Could not find star rating with any selector");
            0.0
        })
}

fn extract_review_count(doc: &Html) -> i32 {
    html::first_text(doc, ".reviews, [class*='review'], [itemprop='reviewCount']")
        .and_then(|text| html::digits_i32(&text))
        .or_else(|| {
            let text = html::page_text(doc);
            REVIEWS_IN_TEXT
                .as_ref()?
                .captures(&text)?
                .get(1)?
                .as_str()
                .parse()
                .ok()
        })
        .unwrap_or(0)
}

/// 从 Novasol 页面中解析房源数据
///
/// 总是返回一条记录，缺失的字段使用默认值
pub fn parse_listing(page: &str, page_url: &str) -> ExtractedRecord {
    let doc = Html::parse_document(page);
    ExtractedRecord {
        name: extract_name(&doc),
        picture_url: extract_picture(&doc, page_url),
        star_rating: extract_rating(&doc),
        review_count: extract_review_count(&doc),
    }
}

#[async_trait]
impl ListingScraper for NovasolScraper {
    fn name(&self) -> &'static str {
        "novasol"
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "novasol.com") || host_matches(url, "novasol.")
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
                e.report("Error fetching Novasol page");
                return None;
            }
        };

        let record = parse_listing(&page, &job.target_url);
        info!(
            "Extracted Novasol listing: name={}, rating={}, reviews={}",
            record.name, record.star_rating, record.review_count
        );
        Some(record)
    }

    async fn fetch_image(&self, vote_option_id: i64, picture_url: &str) -> Option<PathBuf> {
        // Novasol's CDN answers 403 without a site referer
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(IMAGE_REFERER));
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));

        let dest = self.fetcher.picture_path(vote_option_id);
        match self.fetcher.download_image(picture_url, &dest, headers).await {
            Ok(path) => Some(path),
            Err(e) => {
                e.report(&format!(
                    "Error downloading Novasol picture for vote option {}",
                    vote_option_id
                ));
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "novasol_test.rs"]
mod tests;
