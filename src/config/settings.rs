// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::retry_policy::RetryPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 默认浏览器 User-Agent
///
/// 第三方房源站点会拦截非浏览器客户端
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、数据库、抓取、工作池、重试和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 抓取配置
    pub scrape: ScrapeSettings,
    /// 工作池配置
    pub workers: WorkerPoolSettings,
    /// 重试调度配置
    pub retry: RetrySettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSettings {
    /// 图片下载目录
    pub download_folder: String,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 单次请求超时时间（秒），页面和图片共用
    pub request_timeout_secs: u64,
    /// 单张图片允许的最大字节数
    pub max_image_bytes: u64,
    /// 是否接受无效的TLS证书
    pub accept_invalid_certs: bool,
    /// 是否拒绝解析到私有地址的主机
    pub block_private_hosts: bool,
    /// 使用 Open Graph 通用解析的域名列表
    #[serde(default)]
    pub open_graph_domains: Vec<String>,
}

impl ScrapeSettings {
    /// 图片下载目录路径
    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(&self.download_folder)
    }

    /// 请求超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 抓取工作池配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerPoolSettings {
    /// 同时执行的抓取任务上限
    pub max_concurrency: usize,
    /// 等待队列容量
    pub queue_capacity: usize,
}

/// 退避时间上限（30天）
pub const MAX_BACKOFF_CAP_SECS: u64 = 30 * 24 * 60 * 60;

/// 重试调度配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 重试周期（秒）
    pub interval_secs: u64,
    /// 单个周期内并发重试数
    pub concurrency: usize,
    /// 最大重试次数，未设置表示不限
    pub max_attempts: Option<u32>,
    /// 是否启用指数退避
    pub exponential_backoff: bool,
    /// 初始退避时间（秒）
    pub initial_backoff_secs: u64,
    /// 最大退避时间（秒）
    pub max_backoff_secs: u64,
    /// 退避乘数
    pub backoff_multiplier: f64,
}

impl RetrySettings {
    /// 重试周期
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 校验重试配置
    ///
    /// 周期为零、乘数小于1或非有限值、退避时间超出上限都会被拒绝
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Message(
                "retry.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Message(
                "retry.concurrency must be greater than 0".to_string(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::Message(format!(
                "retry.backoff_multiplier must be a finite number >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.max_backoff_secs > MAX_BACKOFF_CAP_SECS {
            return Err(ConfigError::Message(format!(
                "retry.max_backoff_secs must not exceed {}, got {}",
                MAX_BACKOFF_CAP_SECS, self.max_backoff_secs
            )));
        }
        if self.initial_backoff_secs > self.max_backoff_secs {
            return Err(ConfigError::Message(format!(
                "retry.initial_backoff_secs ({}) exceeds retry.max_backoff_secs ({})",
                self.initial_backoff_secs, self.max_backoff_secs
            )));
        }
        Ok(())
    }

    /// 转换为重试策略
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_attempts,
            initial_backoff: Duration::from_secs(self.initial_backoff_secs),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            backoff_multiplier: self.backoff_multiplier,
            jitter_factor: 0.1,
            exponential_backoff: self.exponential_backoff,
            enable_jitter: self.exponential_backoff,
        }
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("VOTECRAWL").separator("__"))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// 仅使用内置默认值创建配置（测试使用）
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize::<Self>()?.validated()
    }

    /// 校验加载后的配置
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.retry.validate()?;
        Ok(self)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB settings
            .set_default("database.url", "sqlite://votecrawl.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scrape settings
            .set_default("scrape.download_folder", "listing_pictures/")?
            .set_default("scrape.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scrape.request_timeout_secs", 20)?
            .set_default("scrape.max_image_bytes", 10 * 1024 * 1024)?
            .set_default("scrape.accept_invalid_certs", false)?
            .set_default("scrape.block_private_hosts", true)?
            .set_default("scrape.open_graph_domains", Vec::<String>::new())?
            // Default worker pool settings
            .set_default("workers.max_concurrency", 10)?
            .set_default("workers.queue_capacity", 500)?
            // Default retry settings
            .set_default("retry.interval_secs", 300)?
            .set_default("retry.concurrency", 4)?
            .set_default("retry.exponential_backoff", false)?
            .set_default("retry.initial_backoff_secs", 0)?
            .set_default("retry.max_backoff_secs", 3600)?
            .set_default("retry.backoff_multiplier", 2.0)?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
