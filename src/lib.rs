// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含应用程序的核心业务逻辑和用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现房源页面的抓取策略、策略路由和共享的HTTP客户端
pub mod engines;

/// 基础设施模块
///
/// 提供数据库连接、仓库实现和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 队列模块
///
/// 实现重试台账和抓取任务入口
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现抓取工作池、重试调度和工作器管理
pub mod workers;

#[cfg(test)]
mod test_support;
