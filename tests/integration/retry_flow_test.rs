// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, eventually};
use axum::http::StatusCode;
use serde_json::{json, Value};
use votecrawl::domain::models::scrape_outcome::FailureKind;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// 图片下载失败后，手动重试只补下载图片
#[tokio::test]
async fn test_manual_retry_completes_picture() {
    let app = create_test_app().await;
    app.mount_listing("loft", "City Loft").await;

    // first download fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/images/loft.png"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&app.site)
        .await;
    app.mount_picture("loft").await;

    let option: Value = app
        .create_option(
            1,
            json!({ "label": "Loft", "externalLink": app.listing_url("loft") }),
        )
        .await
        .json();
    let option_id = option["id"].as_i64().unwrap();

    let ledger = &app.ledger;
    assert!(eventually(|| async move { ledger.contains(option_id) }).await);
    let entry = app.ledger.get(option_id).unwrap();
    assert_eq!(entry.failure_kind, FailureKind::PictureDownloadFailed);

    let data: Value = app
        .server
        .get(&format!("/v1/options/{}/external-data", option_id))
        .await
        .json();
    assert_eq!(data["title"], "City Loft");
    assert_eq!(data["hasPictureDownloaded"], false);

    let response = app.server.post("/v1/scrape/retry").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["report"]["attempted"], 1);
    assert_eq!(body["report"]["succeeded"], 1);
    assert_eq!(body["report"]["remaining"], 0);

    assert!(app.ledger.is_empty());
    let data: Value = app
        .server
        .get(&format!("/v1/options/{}/external-data", option_id))
        .await
        .json();
    assert_eq!(data["hasPictureDownloaded"], true);
}

/// 页面持续失败时，每次重试只让计数加一
#[tokio::test]
async fn test_failing_page_accumulates_retries() {
    let app = create_test_app().await;
    Mock::given(method("GET"))
        .and(path("/listing/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.site)
        .await;

    let option: Value = app
        .create_option(
            1,
            json!({ "label": "Gone", "externalLink": app.listing_url("gone") }),
        )
        .await
        .json();
    let option_id = option["id"].as_i64().unwrap();
    let ledger = &app.ledger;
    assert!(eventually(|| async move { ledger.contains(option_id) }).await);

    for expected in 2..=3 {
        let body: Value = app.server.post("/v1/scrape/retry").await.json();
        assert_eq!(body["report"]["failed"], 1);
        assert_eq!(app.ledger.get(option_id).unwrap().failure_count, expected);
    }

    let entry = app.ledger.get(option_id).unwrap();
    assert_eq!(entry.failure_kind, FailureKind::FullScrapeFailed);
    assert_eq!(
        entry.last_error.as_deref(),
        Some("Extraction failed: no listing data found on page")
    );
}
