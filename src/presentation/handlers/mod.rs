// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP 处理器模块
pub mod external_data_handler;
pub mod retry_handler;
pub mod vote_option_handler;
