// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 每个投票选项的互斥锁管理器
///
/// 同一个投票选项同一时刻只允许一次抓取尝试，
/// 不同选项之间互不影响。
#[derive(Clone, Debug, Default)]
pub struct OptionGuard {
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl OptionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定投票选项的锁，持有期间其他尝试会等待
    ///
    /// # 参数
    ///
    /// * `vote_option_id` - 投票选项ID
    ///
    /// # 返回值
    ///
    /// 释放时自动解锁的守卫
    pub async fn acquire(&self, vote_option_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(vote_option_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// 清理当前没有持有者和等待者的锁
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.locks.len())
    }

    /// 当前跟踪的选项数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
