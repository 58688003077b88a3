// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapeSettings;
use crate::engines::airbnb::AirbnbScraper;
use crate::engines::http_client::HttpFetcher;
use crate::engines::novasol::NovasolScraper;
use crate::engines::open_graph::OpenGraphScraper;
use crate::engines::router::ScraperRouter;
use crate::engines::traits::FetchError;
use std::sync::Arc;

pub mod airbnb;
pub mod html;
pub mod http_client;
pub mod novasol;
pub mod open_graph;
pub mod router;
pub mod traits;
pub mod validators;

/// 按默认顺序注册所有内置抓取策略
///
/// 专用策略在前，Open Graph 通用策略只在配置了域名时注册
pub fn default_router(settings: &ScrapeSettings) -> Result<ScraperRouter, FetchError> {
    let fetcher = Arc::new(HttpFetcher::new(settings)?);

    let mut router = ScraperRouter::new(vec![
        Arc::new(AirbnbScraper::new(fetcher.clone())),
        Arc::new(NovasolScraper::new(fetcher.clone())),
    ]);
    if !settings.open_graph_domains.is_empty() {
        router.register(Arc::new(OpenGraphScraper::new(
            fetcher,
            settings.open_graph_domains.clone(),
        )));
    }

    Ok(router)
}
