//! 輸入資料來源
//!
//! 查詢、檔案讀取等阻塞操作都在來源端完成，引擎只接收完整且已實體化的資料集。

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{ProductRecord, SupplierLink};
use crate::raw::{AggregatedDemandRow, JoinedCatalogRow, RawOrderLine, RawStockRow};
use crate::{ReplenError, Result};

/// 必要輸入資料集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSet {
    Demand,
    Stock,
    Catalog,
}

impl fmt::Display for InputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputSet::Demand => "需求資料",
            InputSet::Stock => "庫存快照",
            InputSet::Catalog => "商品目錄",
        };
        f.write_str(name)
    }
}

/// 需求輸入
#[derive(Debug, Clone, PartialEq)]
pub enum DemandInput {
    /// 未彙總的客戶訂單明細
    OrderLines(Vec<RawOrderLine>),
    /// 已依物料彙總的查詢結果
    Aggregated(Vec<AggregatedDemandRow>),
}

impl DemandInput {
    pub fn len(&self) -> usize {
        match self {
            DemandInput::OrderLines(lines) => lines.len(),
            DemandInput::Aggregated(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 目錄輸入
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogInput {
    /// 商品主檔與供應商關聯（含次要供應商）
    MasterData {
        products: Vec<ProductRecord>,
        links: Vec<SupplierLink>,
    },
    /// 已篩選為主要供應商並聯結好的查詢結果
    Joined(Vec<JoinedCatalogRow>),
}

impl CatalogInput {
    pub fn len(&self) -> usize {
        match self {
            CatalogInput::MasterData { products, .. } => products.len(),
            CatalogInput::Joined(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 輸入資料來源
///
/// 每個方法回傳完整資料集；整份資料無法取得時回傳
/// [`ReplenError::UpstreamUnavailable`]。空資料集是有效結果，不是錯誤。
pub trait InputSource {
    fn demand(&self, target_date: NaiveDate) -> Result<DemandInput>;

    fn stock(&self, target_date: NaiveDate) -> Result<Vec<RawStockRow>>;

    fn catalog(&self) -> Result<CatalogInput>;
}

/// 記憶體內的固定資料來源；未設置的資料集視為不可用
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    demand: Option<DemandInput>,
    stock: Option<Vec<RawStockRow>>,
    catalog: Option<CatalogInput>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置訂單明細
    pub fn with_order_lines(mut self, lines: Vec<RawOrderLine>) -> Self {
        self.demand = Some(DemandInput::OrderLines(lines));
        self
    }

    /// 建構器模式：設置已彙總需求
    pub fn with_aggregated_demand(mut self, rows: Vec<AggregatedDemandRow>) -> Self {
        self.demand = Some(DemandInput::Aggregated(rows));
        self
    }

    /// 建構器模式：設置庫存快照
    pub fn with_stock(mut self, rows: Vec<RawStockRow>) -> Self {
        self.stock = Some(rows);
        self
    }

    /// 建構器模式：設置商品主檔與供應商關聯
    pub fn with_master_data(mut self, products: Vec<ProductRecord>, links: Vec<SupplierLink>) -> Self {
        self.catalog = Some(CatalogInput::MasterData { products, links });
        self
    }

    /// 建構器模式：設置已聯結目錄
    pub fn with_joined_catalog(mut self, rows: Vec<JoinedCatalogRow>) -> Self {
        self.catalog = Some(CatalogInput::Joined(rows));
        self
    }
}

impl InputSource for StaticSource {
    fn demand(&self, _target_date: NaiveDate) -> Result<DemandInput> {
        self.demand
            .clone()
            .ok_or_else(|| ReplenError::unavailable(InputSet::Demand, "未提供需求資料"))
    }

    fn stock(&self, _target_date: NaiveDate) -> Result<Vec<RawStockRow>> {
        self.stock
            .clone()
            .ok_or_else(|| ReplenError::unavailable(InputSet::Stock, "未提供庫存快照"))
    }

    fn catalog(&self) -> Result<CatalogInput> {
        self.catalog
            .clone()
            .ok_or_else(|| ReplenError::unavailable(InputSet::Catalog, "未提供商品目錄"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_unavailable() {
        let source = StaticSource::new().with_stock(vec![]);
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();

        assert!(matches!(
            source.demand(date),
            Err(ReplenError::UpstreamUnavailable {
                input: InputSet::Demand,
                ..
            })
        ));
        assert!(source.stock(date).unwrap().is_empty());
        assert!(source.catalog().is_err());
    }

    #[test]
    fn test_static_source_demand_forms() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let source = StaticSource::new()
            .with_order_lines(vec![RawOrderLine::new("SKU000001", 2)]);
        assert_eq!(source.demand(date).unwrap().len(), 1);

        let source = source.with_aggregated_demand(vec![]);
        let demand = source.demand(date).unwrap();
        assert!(matches!(demand, DemandInput::Aggregated(_)));
        assert!(demand.is_empty());
    }
}
