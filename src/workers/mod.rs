// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 后台任务处理：消费事件入口的抓取工作池、周期性的重试调度器，
/// 以及统一管理两者生命周期的工作管理器
pub mod manager;
pub mod retry_worker;
pub mod scrape_worker;
