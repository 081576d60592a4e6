//! 商品與供應商主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 商品主檔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 物料ID
    pub item_id: String,

    /// 品名
    pub name: String,

    /// 單價
    pub unit_price: Decimal,

    /// 包裝數量（最小採購倍數，至少為 1）
    pub pack_size: u64,

    /// 最小訂購量
    pub min_order_quantity: u64,
}

impl ProductRecord {
    /// 創建新的商品主檔（包裝數量 1、無最小訂購量）
    pub fn new(item_id: String, name: String, unit_price: Decimal) -> Self {
        Self {
            item_id,
            name,
            unit_price,
            pack_size: 1,
            min_order_quantity: 0,
        }
    }

    /// 建構器模式：設置包裝數量
    pub fn with_pack_size(mut self, pack_size: u64) -> Self {
        self.pack_size = pack_size;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_min_order_quantity(mut self, quantity: u64) -> Self {
        self.min_order_quantity = quantity;
        self
    }
}

/// 商品與供應商的關聯
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierLink {
    /// 物料ID
    pub item_id: String,

    /// 供應商ID
    pub supplier_id: String,

    /// 供應商名稱
    pub supplier_name: String,

    /// 交期（天）
    pub lead_time_days: u32,

    /// 是否為主要供應商
    pub is_primary: bool,
}

impl SupplierLink {
    /// 創建主要供應商關聯
    pub fn primary(item_id: String, supplier_id: String, supplier_name: String, lead_time_days: u32) -> Self {
        Self {
            item_id,
            supplier_id,
            supplier_name,
            lead_time_days,
            is_primary: true,
        }
    }

    /// 創建次要供應商關聯
    pub fn secondary(item_id: String, supplier_id: String, supplier_name: String, lead_time_days: u32) -> Self {
        Self {
            is_primary: false,
            ..Self::primary(item_id, supplier_id, supplier_name, lead_time_days)
        }
    }
}

/// 聯結後的目錄項目：商品屬性加上唯一的主要供應商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_id: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub pack_size: u64,
    pub min_order_quantity: u64,
    pub supplier_id: String,
    pub supplier_name: String,
    pub lead_time_days: u32,
}

impl CatalogEntry {
    /// 由商品主檔與主要供應商關聯組成
    pub fn from_parts(product: &ProductRecord, link: &SupplierLink) -> Self {
        Self {
            item_id: product.item_id.clone(),
            product_name: product.name.clone(),
            unit_price: product.unit_price,
            pack_size: product.pack_size,
            min_order_quantity: product.min_order_quantity,
            supplier_id: link.supplier_id.clone(),
            supplier_name: link.supplier_name.clone(),
            lead_time_days: link.lead_time_days,
        }
    }
}
