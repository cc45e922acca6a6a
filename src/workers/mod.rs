// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供抓取工作器和工作器管理功能
/// 包括队列消费、结果收集和工作器生命周期管理
pub mod crawl_worker;
pub mod manager;
pub mod worker;

pub use worker::Worker;
