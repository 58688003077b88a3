// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 相对于页面地址解析图片地址
///
/// 页面地址无法解析时原样返回
pub fn resolve_against(page_url: &str, path: &str) -> String {
    match Url::parse(page_url) {
        Ok(base) => resolve_url(&base, path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.to_string()),
        Err(_) => path.to_string(),
    }
}

/// 判断URL的主机名是否匹配某个站点标识（不区分大小写）
///
/// 标识以 `.` 结尾时（如 `airbnb.`）匹配任意顶级域名，
/// 否则要求主机名等于该域名或是其子域名
pub fn host_matches(url: &str, site: &str) -> bool {
    let host = match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_ascii_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };
    let site = site.trim().to_ascii_lowercase();
    if site.is_empty() {
        return false;
    }

    if site.ends_with('.') {
        return host.starts_with(&site) || host.contains(&format!(".{}", site));
    }

    host == site || host.ends_with(&format!(".{}", site))
}
