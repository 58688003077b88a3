// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库模块
///
/// 提供连接池创建、启动时迁移，以及投票选项、外部数据和本地图片三张表的实体定义
pub mod connection;
pub mod entities;
