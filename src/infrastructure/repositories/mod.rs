// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于 SeaORM 的投票选项和外部数据仓库实现
pub mod external_data_repo_impl;
pub mod vote_option_repo_impl;
