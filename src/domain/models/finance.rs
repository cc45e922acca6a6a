// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 金融标的实体
///
/// 由CRUD层负责创建和删除，抓取运行只读取其代码并回写最新价格。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finance {
    pub id: i32,
    pub symbol: String,
    /// 是否参与定期抓取
    pub is_tracking: bool,
    pub last_closing_price: Option<Decimal>,
    pub daily_change_value: Option<Decimal>,
    pub daily_change_percentage: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 抓取运行开始时读取的标的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedSymbol {
    pub id: i32,
    pub symbol: String,
}

/// 价格历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: i32,
    pub finance_id: i32,
    pub current_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// 标的字段的部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceUpdate {
    pub is_tracking: Option<bool>,
    pub last_closing_price: Option<Decimal>,
    pub daily_change_value: Option<Decimal>,
    pub daily_change_percentage: Option<f64>,
}
