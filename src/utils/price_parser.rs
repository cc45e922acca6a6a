// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

// The number must not touch another digit or separator on either side.
static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d.,])([+-]?)\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?(?:[^\d.,]|$)")
        .expect("valid price regex")
});

/// 价格解析错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PriceParseError {
    #[error("Price text is empty")]
    Empty,
    #[error("No numeric price in '{0}'")]
    NotNumeric(String),
}

/// 将页面上的价格文本解析为十进制数
///
/// 接受货币符号、千分位逗号和前导正负号，例如 `$1,234.56`、`USD 42`、`−3.10`。
/// 文本中只能有一个数字，逗号分组不规范或使用其他地区格式（如 `1.234,56`）时返回错误，
/// 不会截取出一个错误的价格。
pub fn parse_price(text: &str) -> Result<Decimal, PriceParseError> {
    let normalized = text.trim().replace('\u{2212}', "-");
    if normalized.is_empty() {
        return Err(PriceParseError::Empty);
    }

    let captures = PRICE_PATTERN
        .captures(&normalized)
        .ok_or_else(|| PriceParseError::NotNumeric(normalized.clone()))?;

    let matched = captures.get(0).map_or(0..0, |m| m.range());
    let has_stray_digits = normalized[..matched.start]
        .chars()
        .chain(normalized[matched.end..].chars())
        .any(|c| c.is_ascii_digit());
    if has_stray_digits {
        return Err(PriceParseError::NotNumeric(normalized.clone()));
    }

    let sign = match captures.get(1).map(|m| m.as_str()) {
        Some("-") => "-",
        _ => "",
    };
    let integer = captures.get(2).map_or("", |m| m.as_str()).replace(',', "");
    let fraction = captures.get(3).map_or("", |m| m.as_str());

    Decimal::from_str(&format!("{}{}{}", sign, integer, fraction))
        .map_err(|_| PriceParseError::NotNumeric(normalized))
}
