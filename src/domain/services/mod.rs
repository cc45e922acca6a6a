// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务。
///
/// 包含的服务：
/// - 抓取编排（crawl_orchestrator）：驱动一次抓取运行的入队、排空和回写
/// - 单飞门（single_flight_gate）：保证同一时刻最多一个抓取运行
pub mod crawl_orchestrator;
pub mod single_flight_gate;
