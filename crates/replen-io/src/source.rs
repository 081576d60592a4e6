//! JSON 目錄資料來源
//!
//! 目錄結構：
//! - `demand_{date}.json`：已彙總需求列陣列，或 `{"order_lines": [...]}` / `{"aggregated": [...]}`
//! - `stock_{date}.json`：庫存快照列陣列
//! - `catalog.json`：已聯結目錄列陣列，或 `{"products": [...], "links": [...]}`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use replen_core::{
    AggregatedDemandRow, CatalogInput, DemandInput, InputSet, InputSource, JoinedCatalogRow,
    ProductRecord, RawOrderLine, RawStockRow, ReplenError, Result, SupplierLink,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::FileError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedDemand {
    OrderLines(Vec<RawOrderLine>),
    Aggregated(Vec<AggregatedDemandRow>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DemandFile {
    Tagged(TaggedDemand),
    Rows(Vec<AggregatedDemandRow>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    MasterData {
        products: Vec<ProductRecord>,
        links: Vec<SupplierLink>,
    },
    Joined(Vec<JoinedCatalogRow>),
}

/// 從目錄讀取 JSON 檔案的資料來源
///
/// 檔案不存在或無法解析時，整份資料視為不可用。
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn demand_path(&self, target_date: NaiveDate) -> PathBuf {
        self.dir.join(format!("demand_{target_date}.json"))
    }

    pub fn stock_path(&self, target_date: NaiveDate) -> PathBuf {
        self.dir.join(format!("stock_{target_date}.json"))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join("catalog.json")
    }

    fn read<T: DeserializeOwned>(input: InputSet, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)
            .map_err(|e| ReplenError::unavailable(input, FileError::io(path, e).to_string()))?;
        let value = serde_json::from_str(&content)
            .map_err(|e| ReplenError::unavailable(input, FileError::json(path, e).to_string()))?;
        tracing::debug!("已讀取{} {}", input, path.display());
        Ok(value)
    }
}

impl InputSource for JsonDirectorySource {
    fn demand(&self, target_date: NaiveDate) -> Result<DemandInput> {
        let file: DemandFile = Self::read(InputSet::Demand, &self.demand_path(target_date))?;
        Ok(match file {
            DemandFile::Tagged(TaggedDemand::OrderLines(lines)) => DemandInput::OrderLines(lines),
            DemandFile::Tagged(TaggedDemand::Aggregated(rows)) | DemandFile::Rows(rows) => {
                DemandInput::Aggregated(rows)
            }
        })
    }

    fn stock(&self, target_date: NaiveDate) -> Result<Vec<RawStockRow>> {
        Self::read(InputSet::Stock, &self.stock_path(target_date))
    }

    fn catalog(&self) -> Result<CatalogInput> {
        let file: CatalogFile = Self::read(InputSet::Catalog, &self.catalog_path())?;
        Ok(match file {
            CatalogFile::MasterData { products, links } => CatalogInput::MasterData { products, links },
            CatalogFile::Joined(rows) => CatalogInput::Joined(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replen_core::RawValue;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 5).unwrap()
    }

    #[rstest]
    #[case(r#"[{"item_id": "SKU000001", "total_demand": 52, "order_count": 7}]"#, false)]
    #[case(r#"{"aggregated": [{"sku_id": "SKU000001", "total_demand": "52"}]}"#, false)]
    #[case(r#"{"order_lines": [{"item_id": "SKU000001", "quantity": 3}]}"#, true)]
    fn test_demand_file_forms(#[case] json: &str, #[case] order_lines: bool) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("demand_2025-12-05.json"), json).unwrap();

        let demand = JsonDirectorySource::new(dir.path()).demand(date()).unwrap();

        assert_eq!(demand.len(), 1);
        assert_eq!(matches!(demand, DemandInput::OrderLines(_)), order_lines);
    }

    #[test]
    fn test_stock_rows_keep_raw_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("stock_2025-12-05.json"),
            r#"[{"item_id": "SKU000001", "available_stock": "SKU000999", "safety_stock": null}]"#,
        )
        .unwrap();

        let rows = JsonDirectorySource::new(dir.path()).stock(date()).unwrap();

        assert_eq!(rows[0].available_stock, Some(RawValue::from("SKU000999")));
        assert_eq!(rows[0].reserved_stock, None);
        assert_eq!(rows[0].safety_stock, None);
    }

    #[test]
    fn test_catalog_forms() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDirectorySource::new(dir.path());

        fs::write(
            source.catalog_path(),
            r#"{
                "products": [{"item_id": "SKU000001", "name": "Milk", "unit_price": "2.49", "pack_size": 12, "min_order_quantity": 0}],
                "links": [{"item_id": "SKU000001", "supplier_id": "SUP001", "supplier_name": "Dairy Co", "lead_time_days": 2, "is_primary": true}]
            }"#,
        )
        .unwrap();
        assert!(matches!(source.catalog().unwrap(), CatalogInput::MasterData { .. }));

        fs::write(
            source.catalog_path(),
            r#"[{"item_id": "SKU000001", "unit_price": 2.49, "supplier_id": "SUP001"}]"#,
        )
        .unwrap();
        assert!(matches!(source.catalog().unwrap(), CatalogInput::Joined(rows) if rows.len() == 1));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDirectorySource::new(dir.path());

        assert!(matches!(
            source.stock(date()),
            Err(ReplenError::UpstreamUnavailable {
                input: InputSet::Stock,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDirectorySource::new(dir.path());
        fs::write(source.catalog_path(), "{ not json").unwrap();

        let error = source.catalog().unwrap_err();
        assert!(error.to_string().contains("catalog.json"));
    }
}
