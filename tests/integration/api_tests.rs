// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, eventually, PICTURE_BYTES};
use axum::http::StatusCode;
use serde_json::{json, Value};

/// 创建带链接的选项后，后台抓取会补全外部数据和图片
#[tokio::test]
async fn test_create_option_scrapes_listing() {
    let app = create_test_app().await;
    app.mount_listing("cabin", "Lakeside Cabin").await;
    app.mount_picture("cabin").await;

    let response = app
        .create_option(
            3,
            json!({
                "label": "Lakeside",
                "description": "quiet",
                "externalLink": app.listing_url("cabin")
            }),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let option: Value = response.json();
    let option_id = option["id"].as_i64().unwrap();
    assert_eq!(option["voteId"], 3);
    assert_eq!(option["data"]["externalLink"], app.listing_url("cabin"));

    let data_url = format!("/v1/options/{}/external-data", option_id);
    let (server, url) = (&app.server, data_url.as_str());
    let ready = eventually(|| async move {
        let response = server.get(url).await;
        response.status_code() == StatusCode::OK
            && response.json::<Value>()["hasPictureDownloaded"] == true
    })
    .await;
    assert!(ready, "scrape did not complete");

    let data: Value = app.server.get(&data_url).await.json();
    assert_eq!(data["title"], "Lakeside Cabin");
    assert_eq!(data["starRating"], 4.8);
    assert_eq!(data["reviewCount"], 31);
    assert_eq!(data["sourceUrl"], app.listing_url("cabin"));
    assert_eq!(
        data["pictureUrl"],
        format!("{}/images/cabin.png", app.site.uri())
    );

    let picture = app
        .server
        .get(&format!("/v1/options/{}/picture", option_id))
        .await;
    assert_eq!(picture.status_code(), StatusCode::OK);
    assert_eq!(picture.header("content-type"), "image/png");
    assert_eq!(picture.as_bytes().as_ref(), PICTURE_BYTES);
    assert!(app.ledger.is_empty());
}

#[tokio::test]
async fn test_batch_external_data() {
    let app = create_test_app().await;
    app.mount_listing("a", "Cabin A").await;
    app.mount_picture("a").await;

    let option: Value = app
        .create_option(1, json!({ "label": "A", "externalLink": app.listing_url("a") }))
        .await
        .json();
    let option_id = option["id"].as_i64().unwrap();
    let plain: Value = app.create_option(1, json!({ "label": "B" })).await.json();

    let server = &app.server;
    let ready = eventually(|| async move {
        server
            .get(&format!("/v1/options/{}/external-data", option_id))
            .await
            .status_code()
            == StatusCode::OK
    })
    .await;
    assert!(ready);

    let response = app
        .server
        .post("/v1/options/external-data")
        .json(&json!({ "optionIds": [option_id, plain["id"]] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let map: Value = response.json();
    let map = map.as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map[&option_id.to_string()]["title"], "Cabin A");
}

#[tokio::test]
async fn test_option_without_link_is_not_scraped() {
    let app = create_test_app().await;

    let response = app.create_option(1, json!({ "label": "Stay home" })).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let option: Value = response.json();

    let data = app
        .server
        .get(&format!("/v1/options/{}/external-data", option["id"]))
        .await;
    assert_eq!(data.status_code(), StatusCode::NOT_FOUND);
    assert!(data.json::<Value>()["error"].is_string());
    assert!(app.ledger.is_empty());
}

#[tokio::test]
async fn test_invalid_option_is_rejected() {
    let app = create_test_app().await;

    let empty_label = app.create_option(1, json!({ "label": "" })).await;
    assert_eq!(empty_label.status_code(), StatusCode::BAD_REQUEST);

    let bad_link = app
        .create_option(1, json!({ "label": "X", "externalLink": "not a link" }))
        .await;
    assert_eq!(bad_link.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_site_lands_in_ledger() {
    let app = create_test_app().await;

    let option: Value = app
        .create_option(
            1,
            json!({ "label": "Elsewhere", "externalLink": "https://unknown-host.test/x" }),
        )
        .await
        .json();
    let option_id = option["id"].as_i64().unwrap();

    let ledger = &app.ledger;
    assert!(eventually(|| async move { ledger.contains(option_id) }).await);

    let stats: Value = app.server.get("/v1/scrape/retry/statistics").await.json();
    assert_eq!(stats["totalFailed"], 1);
    assert_eq!(stats["fullScrapeFailed"], 1);
    assert_eq!(stats["parked"], 0);
    assert_eq!(
        stats["entries"][0]["lastError"],
        "No scraper available for this URL"
    );
}

#[tokio::test]
async fn test_missing_picture_returns_404() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/options/4242/picture").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
