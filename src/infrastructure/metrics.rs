// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 导出器并注册抓取相关指标的说明
///
/// 地址无效或端口被占用时只记录警告，服务照常启动
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics address {}: {}",
                settings.listen_addr, e
            );
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!(
        "scrape_jobs_total",
        "Scrape executions by operation and outcome"
    );
    describe_counter!(
        "scrape_intake_total",
        "Scrape jobs offered to the worker pool by result"
    );
    describe_counter!("scrape_retry_cycles_total", "Retry cycles started");
    describe_counter!(
        "scrape_retry_attempts_total",
        "Retry attempts by failure kind and result"
    );
    describe_gauge!(
        "scrape_retry_ledger_size",
        "Vote options currently awaiting a retry"
    );
}
