// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::ListingScraper;
use std::sync::Arc;
use tracing::debug;

/// 抓取策略路由器
///
/// 按注册顺序遍历策略，第一个认领URL的策略胜出
#[derive(Clone, Default)]
pub struct ScraperRouter {
    scrapers: Vec<Arc<dyn ListingScraper>>,
}

impl ScraperRouter {
    /// 创建新的策略路由器
    ///
    /// # 参数
    ///
    /// * `scrapers` - 策略列表，顺序即优先级
    pub fn new(scrapers: Vec<Arc<dyn ListingScraper>>) -> Self {
        Self { scrapers }
    }

    /// 追加一个策略（优先级最低）
    pub fn register(&mut self, scraper: Arc<dyn ListingScraper>) {
        self.scrapers.push(scraper);
    }

    /// 为URL选择策略
    ///
    /// # 返回值
    ///
    /// 第一个 `can_handle` 为真的策略，没有则返回 None
    pub fn resolve(&self, url: &str) -> Option<Arc<dyn ListingScraper>> {
        let selected = self.scrapers.iter().find(|s| s.can_handle(url)).cloned();
        match &selected {
            Some(scraper) => debug!("Selected scraper {} for {}", scraper.name(), url),
            None => debug!("No scraper claims {}", url),
        }
        selected
    }

    /// 已注册的策略名称
    pub fn names(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::listing::ExtractedRecord;
    use crate::domain::models::scrape_job::ScrapeJob;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct DomainScraper {
        name: &'static str,
        domain: &'static str,
    }

    #[async_trait]
    impl ListingScraper for DomainScraper {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, url: &str) -> bool {
            url.to_ascii_lowercase().contains(self.domain)
        }

        async fn extract(&self, _job: &ScrapeJob) -> Option<ExtractedRecord> {
            None
        }

        async fn fetch_image(&self, _id: i64, _url: &str) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut router = ScraperRouter::new(vec![
            Arc::new(DomainScraper {
                name: "specific",
                domain: "rentals.example",
            }),
            Arc::new(DomainScraper {
                name: "generic",
                domain: "example",
            }),
        ]);
        router.register(Arc::new(DomainScraper {
            name: "late",
            domain: "late.test",
        }));

        let chosen = router.resolve("https://RENTALS.example/listing/1").unwrap();
        assert_eq!(chosen.name(), "specific");
        let chosen = router.resolve("https://www.example/listing/1").unwrap();
        assert_eq!(chosen.name(), "generic");
        assert_eq!(router.resolve("https://late.test/x").unwrap().name(), "late");
        assert_eq!(router.names(), vec!["specific", "generic", "late"]);
    }

    #[test]
    fn test_no_match() {
        let router = ScraperRouter::default();
        assert!(router.is_empty());
        assert!(router.resolve("https://unknown-host.test/x").is_none());
    }
}
