// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取（crawl）：抓取请求、抓取结果、运行状态和运行汇总
/// - 金融标的（finance）：被跟踪的标的及其价格历史
pub mod crawl;
pub mod finance;
