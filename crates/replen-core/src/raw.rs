//! 邊界原始資料列
//!
//! 外部查詢結果的欄位型別並不可靠：數量可能是整數、浮點數或字串，也可能缺漏。
//! 這裡的型別只負責承載原始值，驗證在各解析器進場時一次完成。

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 原始欄位值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// 解析為非負整數數量
    ///
    /// 接受 `12`、`12.0`、`"12"`、`" 12.0 "`；帶小數、負數或非數值一律視為格式錯誤。
    pub fn to_quantity(&self) -> Option<u64> {
        match self {
            RawValue::Integer(value) => u64::try_from(*value).ok(),
            RawValue::Float(value) => float_decimal(*value).and_then(integral_quantity),
            RawValue::Text(text) => Decimal::from_str(text.trim())
                .ok()
                .and_then(integral_quantity),
        }
    }

    /// 解析為非負金額
    pub fn to_amount(&self) -> Option<Decimal> {
        let amount = match self {
            RawValue::Integer(value) => Some(Decimal::from(*value)),
            RawValue::Float(value) => float_decimal(*value),
            RawValue::Text(text) => Decimal::from_str(text.trim()).ok(),
        }?;

        if amount.is_sign_negative() && !amount.is_zero() {
            None
        } else {
            Some(amount.normalize())
        }
    }
}

/// 以最短十進位表示轉換浮點數，`2.49` 維持為 `2.49` 而不帶二進位尾數
fn float_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

fn integral_quantity(value: Decimal) -> Option<u64> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    if !value.fract().is_zero() {
        return None;
    }
    value.trunc().to_u64()
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(value) => write!(f, "{value}"),
            RawValue::Float(value) => write!(f, "{value}"),
            RawValue::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// 取出非空白的物料ID
pub fn present_id(item_id: Option<&str>) -> Option<&str> {
    item_id.map(str::trim).filter(|id| !id.is_empty())
}

/// 客戶訂單明細（未彙總）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOrderLine {
    #[serde(alias = "sku_id")]
    pub item_id: Option<String>,
    pub quantity: Option<RawValue>,
}

impl RawOrderLine {
    pub fn new(item_id: &str, quantity: impl Into<RawValue>) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            quantity: Some(quantity.into()),
        }
    }
}

/// 已彙總的需求查詢結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatedDemandRow {
    #[serde(alias = "sku_id")]
    pub item_id: Option<String>,
    pub total_demand: Option<RawValue>,
    pub order_count: Option<RawValue>,
}

impl AggregatedDemandRow {
    pub fn new(item_id: &str, total_demand: i64, order_count: i64) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            total_demand: Some(total_demand.into()),
            order_count: Some(order_count.into()),
        }
    }
}

/// 目標日期的庫存快照列（倉庫層級已先行攤平）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStockRow {
    #[serde(alias = "sku_id")]
    pub item_id: Option<String>,
    pub available_stock: Option<RawValue>,
    pub reserved_stock: Option<RawValue>,
    pub safety_stock: Option<RawValue>,
}

impl RawStockRow {
    pub fn new(item_id: &str, available: i64, reserved: i64, safety: i64) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            available_stock: Some(available.into()),
            reserved_stock: Some(reserved.into()),
            safety_stock: Some(safety.into()),
        }
    }
}

/// 已與主要供應商聯結的目錄查詢結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinedCatalogRow {
    #[serde(alias = "sku_id")]
    pub item_id: Option<String>,
    pub product_name: Option<String>,
    pub unit_price: Option<RawValue>,
    pub pack_size: Option<RawValue>,
    pub min_order_quantity: Option<RawValue>,
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,
    pub lead_time_days: Option<RawValue>,
}
