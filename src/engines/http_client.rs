// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapeSettings;
use crate::engines::traits::FetchError;
use crate::engines::validators;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, LOCATION};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// 单次请求最多跟随的重定向次数
pub const MAX_REDIRECTS: usize = 10;

/// 共享的HTTP抓取客户端
///
/// 所有策略共用一个 reqwest 客户端，统一设置 User-Agent、超时和证书校验，
/// 并负责把图片下载到配置的目录。
///
/// 重定向由这里逐跳跟随，每一跳都重新做地址校验。
pub struct HttpFetcher {
    client: reqwest::Client,
    download_dir: PathBuf,
    max_image_bytes: u64,
    block_private_hosts: bool,
}

impl HttpFetcher {
    /// 根据抓取配置创建客户端
    ///
    /// # 参数
    ///
    /// * `settings` - 抓取配置
    ///
    /// # 返回值
    ///
    /// * `Ok(HttpFetcher)` - 客户端
    /// * `Err(FetchError)` - TLS 后端初始化失败
    pub fn new(settings: &ScrapeSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout())
            .connect_timeout(settings.request_timeout())
            .cookie_store(true)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            download_dir: settings.download_path(),
            max_image_bytes: settings.max_image_bytes,
            block_private_hosts: settings.block_private_hosts,
        })
    }

    /// 图片下载目录
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// 投票选项图片的本地文件路径
    pub fn picture_path(&self, vote_option_id: i64) -> PathBuf {
        self.download_dir
            .join(format!("property_{}.png", vote_option_id))
    }

    async fn checked_url(&self, url_str: &str) -> Result<Url, FetchError> {
        let url = validators::parse_http_url(url_str)?;
        if self.block_private_hosts {
            validators::validate_public_host(&url).await?;
        }
        Ok(url)
    }

    /// 解析 Location 并按首跳相同的规则校验
    async fn redirect_target(&self, current: &Url, location: &str) -> Result<Url, FetchError> {
        let next = current.join(location).map_err(|e| {
            FetchError::InvalidUrl(format!("bad redirect from {} to {}: {}", current, location, e))
        })?;
        self.checked_url(next.as_str()).await
    }

    /// 发送 GET 请求并跟随重定向
    ///
    /// # 返回值
    ///
    /// * `Ok((Url, Response))` - 最终地址和响应
    /// * `Err(FetchError)` - 请求失败、重定向目标被拒绝或重定向次数超限
    async fn send(
        &self,
        url: Url,
        headers: HeaderMap,
    ) -> Result<(Url, reqwest::Response), FetchError> {
        let mut url = url;
        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(url.clone())
                .headers(headers.clone())
                .send()
                .await?;
            if !response.status().is_redirection() {
                return Ok((url, response));
            }
            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
            else {
                return Ok((url, response));
            };

            let next = self.redirect_target(&url, &location).await?;
            debug!("Following {} redirect {} -> {}", response.status(), url, next);
            url = next;
        }
        Err(FetchError::TooManyRedirects(MAX_REDIRECTS))
    }

    /// 获取页面HTML
    ///
    /// # 参数
    ///
    /// * `url` - 页面地址
    /// * `headers` - 额外请求头
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 页面内容
    /// * `Err(FetchError)` - 请求失败或状态码不是 2xx
    pub async fn fetch_page(&self, url: &str, headers: HeaderMap) -> Result<String, FetchError> {
        let url = self.checked_url(url).await?;

        let start = Instant::now();
        let (url, response) = self.send(url, headers).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content = response.text().await?;
        debug!(
            "Fetched {} ({} bytes) in {}ms",
            url,
            content.len(),
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    /// 下载图片到指定路径
    ///
    /// 目录不存在时自动创建；先写入 `.part` 临时文件，完整后再重命名，
    /// 超过大小上限时删除临时文件并返回错误。
    ///
    /// # 参数
    ///
    /// * `url` - 图片地址
    /// * `dest` - 目标文件路径
    /// * `headers` - 额外请求头（如 Referer、Accept）
    pub async fn download_image(
        &self,
        url: &str,
        dest: &Path,
        headers: HeaderMap,
    ) -> Result<PathBuf, FetchError> {
        let url = self.checked_url(url).await?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
                info!("Created download directory: {}", parent.display());
            }
        }

        let (url, response) = self.send(url, headers).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared.is_some_and(|len| len > self.max_image_bytes) {
            return Err(FetchError::TooLarge {
                limit: self.max_image_bytes,
            });
        }

        let part_path = dest.with_extension("png.part");
        let written = match self.stream_to_file(response, &part_path).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(e);
            }
        };
        tokio::fs::rename(&part_path, dest).await?;

        info!("Downloaded {} ({} bytes) to {}", url, written, dest.display());
        Ok(dest.to_path_buf())
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        path: &Path,
    ) -> Result<u64, FetchError> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_image_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_image_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
#[path = "http_client_test.rs"]
mod tests;
