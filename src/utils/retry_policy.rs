// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// 重试策略配置
///
/// 默认不限次数、无退避：每个周期都会重试所有失败项
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数，None 表示不限
    pub max_retries: Option<u32>,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用指数退避
    pub exponential_backoff: bool,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(3600),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            exponential_backoff: false,
            enable_jitter: false,
        }
    }
}

impl RetryPolicy {
    /// 创建有上限的指数退避策略
    pub fn bounded(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            initial_backoff,
            max_backoff,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            exponential_backoff: true,
            enable_jitter: true,
        }
    }

    /// 计算下次重试的退避时间
    ///
    /// `attempt` 为已经失败的次数（从1开始）
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.initial_backoff;
        }

        // 计算指数退避
        let exponent = attempt.saturating_sub(1).min(64) as i32;
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        // 限制在 [0, max_backoff]，NaN 按上限处理
        let max_secs = self.max_backoff.as_secs_f64();
        let capped_backoff = if backoff_secs.is_nan() {
            max_secs
        } else {
            backoff_secs.clamp(0.0, max_secs)
        };

        // 添加抖动
        let jitter_range = capped_backoff * self.jitter_factor;
        let final_backoff = if self.enable_jitter && jitter_range.is_finite() && jitter_range > 0.0
        {
            let jitter = rand::random_range(-jitter_range..jitter_range);
            (capped_backoff + jitter).max(0.0)
        } else {
            capped_backoff
        };

        Duration::try_from_secs_f64(final_backoff).unwrap_or(self.max_backoff)
    }

    /// 计算下次重试时间
    ///
    /// 超出可表示范围时返回最大时间
    pub fn next_retry_time(&self, attempt: u32, base_time: DateTime<Utc>) -> DateTime<Utc> {
        let backoff = self.calculate_backoff(attempt);
        chrono::Duration::from_std(backoff)
            .ok()
            .and_then(|delta| base_time.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// 是否应该重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        match self.max_retries {
            Some(max) => attempt < max,
            None => true,
        }
    }

    /// 判断在 `now` 时刻是否到了重试时间
    pub fn is_due(&self, attempt: u32, last_attempt: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.next_retry_time(attempt, last_attempt) <= now
    }
}
