// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 事件入口（scrape_queue）把新任务交给抓取工作池，
/// 重试台账（retry_ledger）记录尚未完成的抓取工作
pub mod retry_ledger;
pub mod scrape_queue;
