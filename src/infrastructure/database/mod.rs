// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库模块
///
/// 连接池创建、迁移执行，以及 `finances` 和 `finance_history` 两张表的实体
pub mod connection;
pub mod entities;
