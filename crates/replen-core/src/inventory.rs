//! 庫存模型

use serde::{Deserialize, Serialize};

use crate::config::StockDefaults;

/// 庫存數值來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockOrigin {
    /// 快照中的實際數值
    Snapshot,
    /// 快照列存在，但部分欄位缺失並以預設值補齊
    PartialDefaults,
    /// 快照列無法解析，整列改用預設值
    FallbackDefaults,
    /// 目標日期沒有任何快照列
    Missing,
}

/// 目標日期的單一物料庫存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 物料ID
    pub item_id: String,

    /// 現有可用庫存
    pub available_stock: u64,

    /// 已保留（已承諾）數量
    pub reserved_stock: u64,

    /// 安全庫存
    pub safety_stock: u64,

    /// 數值來源
    pub origin: StockOrigin,
}

impl StockRecord {
    /// 創建快照庫存記錄
    pub fn new(item_id: String, available_stock: u64, reserved_stock: u64, safety_stock: u64) -> Self {
        Self {
            item_id,
            available_stock,
            reserved_stock,
            safety_stock,
            origin: StockOrigin::Snapshot,
        }
    }

    /// 以預設庫存建立記錄
    pub fn from_defaults(item_id: String, defaults: &StockDefaults, origin: StockOrigin) -> Self {
        Self {
            item_id,
            available_stock: defaults.available_stock,
            reserved_stock: defaults.reserved_stock,
            safety_stock: defaults.safety_stock,
            origin,
        }
    }

    /// 淨可用庫存（可用 - 保留），保留量大於可用量時為負
    pub fn net_available(&self) -> i128 {
        i128::from(self.available_stock) - i128::from(self.reserved_stock)
    }

    /// 是否使用了預設值
    pub fn is_defaulted(&self) -> bool {
        self.origin != StockOrigin::Snapshot
    }
}
