// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节：数据库连接与实体映射、
/// 领域仓库接口的 SeaORM 实现，以及 Prometheus 指标导出。
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体的存储技术。
pub mod database;
pub mod metrics;
pub mod repositories;
