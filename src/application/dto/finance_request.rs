// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateFinanceDto {
    #[validate(length(min = 1, max = 50))]
    pub symbol: String,
    /// 缺省时为 `true`，新建的标的会参与下一次抓取
    pub is_tracking: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateFinanceDto {
    pub is_tracking: Option<bool>,
    pub last_closing_price: Option<Decimal>,
    pub daily_change_value: Option<Decimal>,
    #[validate(range(min = -100.0, max = 10000.0))]
    pub daily_change_percentage: Option<f64>,
}

/// 标的详情查询参数
#[derive(Debug, Default, Deserialize)]
pub struct FinanceDetailsQuery {
    #[serde(default)]
    pub with_history: bool,
    pub from_ts: Option<String>,
    pub to_ts: Option<String>,
}

/// 解析时间参数
///
/// 接受 RFC 3339；不带时区的 ISO-8601 时间或日期按 UTC 处理
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("Invalid timestamp '{}'", value))
}
