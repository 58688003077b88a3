// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含抓取流水线的核心业务逻辑，包括：
/// - 领域模型（models）：抓取任务、外部数据、重试条目
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：抓取执行和外部数据查询
///
/// 领域层不依赖于任何具体的存储实现。
pub mod models;
pub mod repositories;
pub mod services;
