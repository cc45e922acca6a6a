// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finance::{Finance, PriceRecord};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FinanceSummaryResponse {
    pub id: i32,
    pub symbol: String,
    pub is_tracking: bool,
}

impl From<&Finance> for FinanceSummaryResponse {
    fn from(f: &Finance) -> Self {
        Self {
            id: f.id,
            symbol: f.symbol.clone(),
            is_tracking: f.is_tracking,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FinanceRefResponse {
    pub id: i32,
    pub symbol: String,
}

impl From<&Finance> for FinanceRefResponse {
    fn from(f: &Finance) -> Self {
        Self {
            id: f.id,
            symbol: f.symbol.clone(),
        }
    }
}

/// 标的详情，按需附带价格历史
#[derive(Debug, Serialize)]
pub struct FinanceDetailsResponse {
    #[serde(flatten)]
    pub finance: Finance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<PriceRecord>>,
}
