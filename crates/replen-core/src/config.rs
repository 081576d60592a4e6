//! 補貨計算配置
//!
//! 預設庫存、目錄預設值與取整規則都從這裡傳入計算引擎，不寫死在公式中。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ReplenError, Result};

/// 補貨計算配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishmentConfig {
    /// 庫存資料缺失或損壞時的預設庫存
    pub stock_defaults: StockDefaults,

    /// 目錄欄位缺失時的預設值
    pub catalog_defaults: CatalogDefaults,

    /// 訂單明細數量無法解析時的處理方式
    pub malformed_quantity_policy: MalformedQuantityPolicy,

    /// 最小訂購量與包裝倍數的套用順序
    pub moq_policy: MoqPolicy,

    /// 批次內訂單明細排序
    pub line_sort: LineSort,

    /// 候選物料數達到此值時改用並行計算
    pub parallel_threshold: usize,
}

impl Default for ReplenishmentConfig {
    fn default() -> Self {
        Self {
            stock_defaults: StockDefaults::default(),
            catalog_defaults: CatalogDefaults::default(),
            malformed_quantity_policy: MalformedQuantityPolicy::Skip,
            moq_policy: MoqPolicy::AfterPackRounding,
            line_sort: LineSort::Insertion,
            parallel_threshold: 1024,
        }
    }
}

impl ReplenishmentConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 字串讀取配置，未提供的欄位採預設值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 從 JSON 檔案讀取配置
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 建構器模式：設置預設庫存
    pub fn with_stock_defaults(mut self, defaults: StockDefaults) -> Self {
        self.stock_defaults = defaults;
        self
    }

    /// 建構器模式：設置目錄預設值
    pub fn with_catalog_defaults(mut self, defaults: CatalogDefaults) -> Self {
        self.catalog_defaults = defaults;
        self
    }

    /// 建構器模式：設置數量格式錯誤處理方式
    pub fn with_malformed_quantity_policy(mut self, policy: MalformedQuantityPolicy) -> Self {
        self.malformed_quantity_policy = policy;
        self
    }

    /// 建構器模式：設置最小訂購量規則
    ///
    /// # 範例
    /// ```
    /// # use replen_core::{MoqPolicy, ReplenishmentConfig};
    /// let config = ReplenishmentConfig::new().with_moq_policy(MoqPolicy::AlignedToPack);
    /// assert_eq!(config.moq_policy, MoqPolicy::AlignedToPack);
    /// ```
    pub fn with_moq_policy(mut self, policy: MoqPolicy) -> Self {
        self.moq_policy = policy;
        self
    }

    /// 建構器模式：設置批次內排序
    pub fn with_line_sort(mut self, sort: LineSort) -> Self {
        self.line_sort = sort;
        self
    }

    /// 建構器模式：設置並行門檻
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.catalog_defaults.pack_size == 0 {
            return Err(ReplenError::InvalidConfig(
                "catalog_defaults.pack_size 必須至少為 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 預設庫存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockDefaults {
    pub available_stock: u64,
    pub reserved_stock: u64,
    pub safety_stock: u64,
}

impl Default for StockDefaults {
    fn default() -> Self {
        Self {
            available_stock: 50,
            reserved_stock: 0,
            safety_stock: 10,
        }
    }
}

/// 目錄欄位預設值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDefaults {
    pub pack_size: u64,
    pub min_order_quantity: u64,
    pub lead_time_days: u32,
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            pack_size: 1,
            min_order_quantity: 0,
            lead_time_days: 7,
        }
    }
}

/// 訂單明細數量無法解析時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedQuantityPolicy {
    /// 略過該明細並記錄
    Skip,
    /// 以數量 0 計入（仍計算明細筆數）並記錄
    CoerceToZero,
}

/// 最小訂購量規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoqPolicy {
    /// 先依包裝取整，再以最小訂購量為下限；結果可能不是包裝倍數
    AfterPackRounding,
    /// 最小訂購量本身也向上取整到包裝倍數
    AlignedToPack,
}

/// 批次內訂單明細排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSort {
    /// 保持上游目錄順序
    Insertion,
    /// 依物料ID
    ItemId,
    /// 依明細金額由高到低
    TotalValueDesc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplenishmentConfig::new();

        assert_eq!(config.stock_defaults.available_stock, 50);
        assert_eq!(config.stock_defaults.reserved_stock, 0);
        assert_eq!(config.stock_defaults.safety_stock, 10);
        assert_eq!(config.catalog_defaults.pack_size, 1);
        assert_eq!(config.catalog_defaults.lead_time_days, 7);
        assert_eq!(config.moq_policy, MoqPolicy::AfterPackRounding);
        assert_eq!(config.malformed_quantity_policy, MalformedQuantityPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ReplenishmentConfig::new()
            .with_stock_defaults(StockDefaults {
                available_stock: 0,
                reserved_stock: 0,
                safety_stock: 5,
            })
            .with_malformed_quantity_policy(MalformedQuantityPolicy::CoerceToZero)
            .with_line_sort(LineSort::ItemId)
            .with_parallel_threshold(1);

        assert_eq!(config.stock_defaults.safety_stock, 5);
        assert_eq!(config.line_sort, LineSort::ItemId);
        assert_eq!(config.parallel_threshold, 1);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ReplenishmentConfig::from_json_str(
            r#"{"moq_policy": "aligned_to_pack", "stock_defaults": {"safety_stock": 20}}"#,
        )
        .unwrap();

        assert_eq!(config.moq_policy, MoqPolicy::AlignedToPack);
        assert_eq!(config.stock_defaults.safety_stock, 20);
        assert_eq!(config.stock_defaults.available_stock, 50);
        assert_eq!(config.line_sort, LineSort::Insertion);
    }

    #[test]
    fn test_reject_zero_pack_size() {
        let result =
            ReplenishmentConfig::from_json_str(r#"{"catalog_defaults": {"pack_size": 0}}"#);
        assert!(matches!(result, Err(ReplenError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replen.json");
        std::fs::write(&path, r#"{"parallel_threshold": 8}"#).unwrap();

        let config = ReplenishmentConfig::from_json_file(&path).unwrap();
        assert_eq!(config.parallel_threshold, 8);
    }
}
