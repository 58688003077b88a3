// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 失败分类
///
/// 决定重试时走完整重新抓取还是只补下载图片
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// 整体抓取失败，需要重新提取
    FullScrapeFailed,
    /// 数据已保存，仅图片下载失败
    PictureDownloadFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::FullScrapeFailed => write!(f, "FULL_SCRAPE_FAILED"),
            FailureKind::PictureDownloadFailed => write!(f, "PICTURE_DOWNLOAD_FAILED"),
        }
    }
}

/// 抓取错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    /// 没有策略认领该URL
    #[error("No scraper available for this URL")]
    NoStrategyAvailable,
    /// 页面已获取但未识别出房源数据
    #[error("Extraction failed: no listing data found on page")]
    ExtractionFailed,
    /// 数据已保存，图片下载失败
    #[error("Data saved but picture download failed")]
    PictureDownloadFailed,
    /// 只补图片时找不到已保存的外部数据
    #[error("No external data found for vote option {0}")]
    MissingExternalData(i64),
    /// 持久化失败
    #[error("Data storage failed: {0}")]
    Storage(String),
}

impl ScrapeError {
    /// 对应的重试分类
    ///
    /// 存储失败一律按整体失败处理
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScrapeError::PictureDownloadFailed => FailureKind::PictureDownloadFailed,
            ScrapeError::NoStrategyAvailable
            | ScrapeError::ExtractionFailed
            | ScrapeError::MissingExternalData(_)
            | ScrapeError::Storage(_) => FailureKind::FullScrapeFailed,
        }
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            ScrapeError::NoStrategyAvailable => "no_strategy",
            ScrapeError::ExtractionFailed => "extraction_failed",
            ScrapeError::PictureDownloadFailed => "picture_failed",
            ScrapeError::MissingExternalData(_) => "missing_external_data",
            ScrapeError::Storage(_) => "storage_failed",
        }
    }
}

/// 抓取执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub error: Option<ScrapeError>,
}

impl ScrapeOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: ScrapeError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }

    /// 错误信息
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// 失败分类，成功时为 None
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(ScrapeError::failure_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failure_is_always_full_scrape() {
        let err = ScrapeError::Storage("insert into local_picture_store failed".to_string());
        assert_eq!(err.failure_kind(), FailureKind::FullScrapeFailed);
        assert_eq!(
            ScrapeOutcome::failure(err).failure_kind(),
            Some(FailureKind::FullScrapeFailed)
        );
    }

    #[test]
    fn test_partial_success_classification() {
        let outcome = ScrapeOutcome::failure(ScrapeError::PictureDownloadFailed);
        assert!(!outcome.success);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::PictureDownloadFailed));
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("Data saved but picture download failed")
        );
    }

    #[test]
    fn test_no_strategy_message() {
        let outcome = ScrapeOutcome::failure(ScrapeError::NoStrategyAvailable);
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("No scraper available for this URL")
        );
        assert_eq!(outcome.failure_kind(), Some(FailureKind::FullScrapeFailed));
        assert_eq!(ScrapeOutcome::success().failure_kind(), None);
    }

    #[test]
    fn test_failure_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&FailureKind::PictureDownloadFailed).unwrap(),
            "\"PICTURE_DOWNLOAD_FAILED\""
        );
        assert_eq!(FailureKind::FullScrapeFailed.to_string(), "FULL_SCRAPE_FAILED");
    }
}
