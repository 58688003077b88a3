// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 投票选项仓库（vote_option_repository）：投票选项的创建和外部链接查询
/// - 外部数据仓库（external_data_repository）：外部数据与本地图片的持久化
pub mod external_data_repository;
pub mod vote_option_repository;
