// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 抓取服务（scrape_service）：选择策略、提取、下载图片并持久化
/// - 外部数据服务（external_data_service）：外部数据和本地图片的只读查询
/// - 选项锁（option_guard）：保证同一投票选项的抓取尝试串行执行
pub mod external_data_service;
pub mod option_guard;
pub mod scrape_service;
