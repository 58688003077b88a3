// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapeSettings;
use crate::engines::http_client::{HttpFetcher, MAX_REDIRECTS};
use crate::engines::traits::FetchError;
use axum::{
    http::{header, HeaderMap as AxumHeaders, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tokio::net::TcpListener;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

async fn start_test_server() -> String {
    let app = Router::new()
        .route(
            "/listing",
            get(|| async {
                Response::builder()
                    .header("content-type", "text/html")
                    .body("<html><body><h1>Cabin A</h1></body></html>".to_string())
                    .unwrap()
            }),
        )
        .route(
            "/picture.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route(
            "/guarded.png",
            get(|headers: AxumHeaders| async move {
                match headers.get("referer").and_then(|v| v.to_str().ok()) {
                    Some("https://www.novasol.at/") => {
                        ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES).into_response()
                    }
                    _ => StatusCode::FORBIDDEN.into_response(),
                }
            }),
        )
        .route("/huge.png", get(|| async { vec![7u8; 4096] }))
        .route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/listing")]) }),
        )
        .route(
            "/moved-picture",
            get(|| async {
                (
                    StatusCode::MOVED_PERMANENTLY,
                    [(header::LOCATION, "/picture.png")],
                )
            }),
        )
        .route(
            "/loop",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/loop")]) }),
        )
        .route(
            "/to-file",
            get(|| async {
                (StatusCode::FOUND, [(header::LOCATION, "file:///etc/passwd")])
            }),
        )
        .route(
            "/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn test_settings(dir: &std::path::Path, max_image_bytes: u64, block: bool) -> ScrapeSettings {
    ScrapeSettings {
        download_folder: dir.join("pictures").to_string_lossy().to_string(),
        user_agent: "votecrawl-test".to_string(),
        request_timeout_secs: 5,
        max_image_bytes,
        accept_invalid_certs: false,
        block_private_hosts: block,
        open_graph_domains: Vec::new(),
    }
}

#[tokio::test]
async fn test_fetch_page_returns_body() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();

    let body = fetcher
        .fetch_page(&format!("{}/listing", server), HeaderMap::new())
        .await
        .unwrap();
    assert!(body.contains("Cabin A"));
}

#[tokio::test]
async fn test_fetch_page_rejects_error_status() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();

    let result = fetcher
        .fetch_page(&format!("{}/error", server), HeaderMap::new())
        .await;
    assert!(matches!(result, Err(FetchError::Status(500))));
    assert!(result.unwrap_err().is_retryable());
}

#[tokio::test]
async fn test_download_image_creates_directory_and_file() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();
    let dest = fetcher.picture_path(42);
    assert!(dest.ends_with("property_42.png"));
    assert!(!fetcher.download_dir().exists());

    let path = fetcher
        .download_image(&format!("{}/picture.png", server), &dest, HeaderMap::new())
        .await
        .unwrap();

    assert_eq!(path, dest);
    assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);
    assert!(!dest.with_extension("png.part").exists());
}

#[tokio::test]
async fn test_download_image_sends_extra_headers() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();
    let url = format!("{}/guarded.png", server);

    let denied = fetcher
        .download_image(&url, &fetcher.picture_path(1), HeaderMap::new())
        .await;
    assert!(matches!(denied, Err(FetchError::Status(403))));

    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static("https://www.novasol.at/"));
    assert!(fetcher
        .download_image(&url, &fetcher.picture_path(1), headers)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_download_image_enforces_size_limit() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();
    let dest = fetcher.picture_path(7);

    let result = fetcher
        .download_image(&format!("{}/huge.png", server), &dest, HeaderMap::new())
        .await;

    assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024 })));
    assert!(!dest.exists());
    assert!(!dest.with_extension("png.part").exists());
}

#[tokio::test]
async fn test_private_hosts_blocked_when_enabled() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, true)).unwrap();

    let result = fetcher
        .fetch_page(&format!("{}/listing", server), HeaderMap::new())
        .await;
    assert!(matches!(result, Err(FetchError::Blocked(_))));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();

    let body = fetcher
        .fetch_page(&format!("{}/moved", server), HeaderMap::new())
        .await
        .unwrap();
    assert!(body.contains("Cabin A"));

    let dest = dir.path().join("pictures").join("property_9.png");
    fetcher
        .download_image(&format!("{}/moved-picture", server), &dest, HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_redirect_loop_stops() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();

    let result = fetcher
        .fetch_page(&format!("{}/loop", server), HeaderMap::new())
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, FetchError::TooManyRedirects(n) if n == MAX_REDIRECTS));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_redirect_to_non_http_scheme_rejected() {
    let server = start_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, false)).unwrap();

    let result = fetcher
        .fetch_page(&format!("{}/to-file", server), HeaderMap::new())
        .await;
    assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_redirect_to_private_address_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&test_settings(dir.path(), 1024, true)).unwrap();
    let listing = url::Url::parse("https://listings.example/rooms/1").unwrap();

    for location in [
        "http://169.254.169.254/latest/meta-data/",
        "http://127.0.0.1:8080/admin",
        "http://[::1]/",
        "http://localhost/internal",
    ] {
        let result = fetcher.redirect_target(&listing, location).await;
        assert!(
            matches!(result, Err(FetchError::Blocked(_))),
            "redirect to {} should be blocked",
            location
        );
    }
}
