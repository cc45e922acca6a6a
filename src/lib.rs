// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含金融标的管理用例和请求DTO
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、抓取编排服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现价格页面抓取器和带重试的抓取客户端
pub mod engines;

/// 基础设施模块
///
/// 提供数据库连接、实体映射、仓库实现和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 队列模块
///
/// 实现抓取请求队列和结果收集器
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现抓取工作器和工作器管理
pub mod workers;
