// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了抓取流水线的核心业务实体，包括：
/// - 抓取任务（scrape_job）：外部链接与投票选项的配对
/// - 房源数据（listing）：提取结果、外部数据记录和本地图片
/// - 抓取结果（scrape_outcome）：执行结果、错误分类
/// - 重试条目（retry_entry）：重试台账中的失败状态
/// - 投票选项（vote_option）：只读引用的投票选项
pub mod listing;
pub mod retry_entry;
pub mod scrape_job;
pub mod scrape_outcome;
pub mod vote_option;
