// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::FetchError;
use std::net::IpAddr;
use tokio::net::lookup_host;
use url::Url;

/// 解析URL并只接受 http/https 协议
pub fn parse_http_url(url_str: &str) -> Result<Url, FetchError> {
    let url = Url::parse(url_str.trim())
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url_str, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, url_str
            )))
        }
    }
    if url.host_str().is_none() {
        return Err(FetchError::InvalidUrl(format!("missing host in {}", url_str)));
    }
    Ok(url)
}

/// 验证 URL 是否安全 (防止 SSRF)
///
/// 解析主机名，拒绝私有地址、环回地址、链路本地地址和组播地址
pub async fn validate_public_host(url: &Url) -> Result<(), FetchError> {
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl(format!("missing host in {}", url)))?;

    if host.eq_ignore_ascii_case("localhost") {
        return Err(FetchError::Blocked("localhost is not allowed".to_string()));
    }

    // lookup_host 需要 host:port，IPv6 字面量需要保留方括号
    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = lookup_host(format!("{}:{}", host, port))
        .await
        .map_err(|e| FetchError::InvalidUrl(format!("cannot resolve {}: {}", host, e)))?;

    for addr in addrs {
        if is_private_ip(addr.ip()) {
            return Err(FetchError::Blocked(format!(
                "private address {} for host {}",
                addr.ip(),
                host
            )));
        }
    }

    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
            ipv4.is_private()
                || ipv4.is_loopback()
                || ipv4.is_link_local()
                || ipv4.is_unspecified()
                // 224.0.0.0/4 (Multicast)
                || (224..=239).contains(&octets[0])
        }
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            let first = ipv6.segments()[0];
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique Local Address (fc00::/7)
                || (first & 0xfe00) == 0xfc00
                // Link-local (fe80::/10)
                || (first & 0xffc0) == 0xfe80
                // Multicast (ff00::/8)
                || (first & 0xff00) == 0xff00
        }
    }
}
