// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
///
/// 包含的仓库接口：
/// - 价格仓库（price_repository）：抓取编排所需的读取快照与写入价格
/// - 标的仓库（finance_repository）：标的资源的CRUD和历史查询
pub mod finance_repository;
pub mod price_repository;
