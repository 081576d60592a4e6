//! 商品目錄聯結
//!
//! 每個物料必須恰好有一個主要供應商。沒有或多於一個時排除該物料並回報，
//! 不會以「取第一筆」的方式默默決定。

use std::collections::{HashMap, HashSet};

use replen_core::raw::present_id;
use replen_core::{
    CatalogDefaults, CatalogEntry, CatalogInput, CatalogIntegrityError, DataQualityError,
    InputSet, JoinedCatalogRow, ProductRecord, RawValue, RunIssue, SupplierLink,
};

use crate::Resolved;

/// 聯結後的目錄，保持上游商品順序，計算期間唯讀
#[derive(Debug, Clone, Default)]
pub struct JoinedCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    excluded: HashSet<String>,
}

impl JoinedCatalog {
    pub fn get(&self, item_id: &str) -> Option<&CatalogEntry> {
        self.index.get(item_id).map(|&position| &self.entries[position])
    }

    /// 依上游順序走訪
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 物料是否因目錄完整性問題被排除
    pub fn is_excluded(&self, item_id: &str) -> bool {
        self.excluded.contains(item_id)
    }

    fn push(&mut self, entry: CatalogEntry) {
        self.index.insert(entry.item_id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    fn exclude(&mut self, error: CatalogIntegrityError, issues: &mut Vec<RunIssue>) {
        tracing::warn!("{}", error);
        self.excluded.insert(error.item_id().to_string());
        issues.push(RunIssue::from(error));
    }
}

/// 商品目錄聯結器
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogJoiner {
    defaults: CatalogDefaults,
}

impl CatalogJoiner {
    pub fn new(defaults: CatalogDefaults) -> Self {
        Self { defaults }
    }

    /// 依輸入形式建立目錄
    pub fn resolve(&self, input: &CatalogInput) -> Resolved<JoinedCatalog> {
        match input {
            CatalogInput::MasterData { products, links } => self.join(products, links),
            CatalogInput::Joined(rows) => self.from_joined_rows(rows),
        }
    }

    /// 聯結商品主檔與主要供應商
    pub fn join(&self, products: &[ProductRecord], links: &[SupplierLink]) -> Resolved<JoinedCatalog> {
        let mut catalog = JoinedCatalog::default();
        let mut issues = Vec::new();

        let mut primaries: HashMap<&str, Vec<&SupplierLink>> = HashMap::new();
        for link in links.iter().filter(|link| link.is_primary) {
            if let Some(item_id) = present_id(Some(link.item_id.as_str())) {
                primaries.entry(item_id).or_default().push(link);
            }
        }

        let mut product_counts: HashMap<&str, usize> = HashMap::new();
        for product in products {
            if let Some(item_id) = present_id(Some(product.item_id.as_str())) {
                *product_counts.entry(item_id).or_default() += 1;
            }
        }

        for (index, product) in products.iter().enumerate() {
            let Some(item_id) = present_id(Some(product.item_id.as_str())) else {
                issues.push(RunIssue::from(DataQualityError::MissingItemId {
                    input: InputSet::Catalog,
                    row: index + 1,
                }));
                continue;
            };

            if catalog.is_excluded(item_id) {
                continue;
            }
            if product_counts.get(item_id).copied().unwrap_or(0) > 1 {
                catalog.exclude(
                    CatalogIntegrityError::DuplicateProduct {
                        item_id: item_id.to_string(),
                    },
                    &mut issues,
                );
                continue;
            }

            let links = primaries.get(item_id).map(Vec::as_slice).unwrap_or_default();
            match links {
                [] => catalog.exclude(
                    CatalogIntegrityError::NoPrimarySupplier {
                        item_id: item_id.to_string(),
                    },
                    &mut issues,
                ),
                [link] => {
                    let mut entry = CatalogEntry::from_parts(product, link);
                    entry.item_id = item_id.to_string();
                    entry.pack_size = Self::checked_pack_size(item_id, entry.pack_size, &mut issues);
                    catalog.push(entry);
                }
                many => catalog.exclude(
                    CatalogIntegrityError::MultiplePrimarySuppliers {
                        item_id: item_id.to_string(),
                        supplier_ids: many.iter().map(|link| link.supplier_id.clone()).collect(),
                    },
                    &mut issues,
                ),
            }
        }

        let orphan_links = primaries
            .keys()
            .filter(|item_id| !product_counts.contains_key(*item_id))
            .count();
        if orphan_links > 0 {
            tracing::debug!("{} 個主要供應商關聯沒有對應商品，已忽略", orphan_links);
        }

        tracing::debug!("商品 {} 筆，聯結後目錄 {} 筆", products.len(), catalog.len());
        Resolved::new(catalog, issues)
    }

    /// 使用已篩選為主要供應商的聯結查詢結果
    ///
    /// 同一物料出現多列代表有多個主要供應商。缺少的包裝數量、最小訂購量、
    /// 交期採用 [`CatalogDefaults`]；單價缺失或無法解析時排除該物料。
    pub fn from_joined_rows(&self, rows: &[JoinedCatalogRow]) -> Resolved<JoinedCatalog> {
        let mut catalog = JoinedCatalog::default();
        let mut issues = Vec::new();

        let mut order: Vec<&str> = Vec::new();
        let mut grouped: HashMap<&str, Vec<&JoinedCatalogRow>> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            let Some(item_id) = present_id(row.item_id.as_deref()) else {
                issues.push(RunIssue::from(DataQualityError::MissingItemId {
                    input: InputSet::Catalog,
                    row: index + 1,
                }));
                continue;
            };
            let group = grouped.entry(item_id).or_default();
            if group.is_empty() {
                order.push(item_id);
            }
            group.push(row);
        }

        for item_id in order {
            match grouped[item_id].as_slice() {
                [row] => match self.parse_joined_row(item_id, row, &mut issues) {
                    Ok(entry) => catalog.push(entry),
                    Err(error) => catalog.exclude(error, &mut issues),
                },
                many => catalog.exclude(
                    CatalogIntegrityError::MultiplePrimarySuppliers {
                        item_id: item_id.to_string(),
                        supplier_ids: many
                            .iter()
                            .map(|row| row.supplier_id.clone().unwrap_or_default())
                            .collect(),
                    },
                    &mut issues,
                ),
            }
        }

        tracing::debug!("目錄查詢 {} 列，聯結後目錄 {} 筆", rows.len(), catalog.len());
        Resolved::new(catalog, issues)
    }

    fn parse_joined_row(
        &self,
        item_id: &str,
        row: &JoinedCatalogRow,
        issues: &mut Vec<RunIssue>,
    ) -> Result<CatalogEntry, CatalogIntegrityError> {
        let Some(supplier_id) = present_id(row.supplier_id.as_deref()) else {
            return Err(CatalogIntegrityError::NoPrimarySupplier {
                item_id: item_id.to_string(),
            });
        };

        let unit_price = match row.unit_price.as_ref() {
            Some(raw) => raw.to_amount().ok_or_else(|| invalid(item_id, "unit_price", Some(raw)))?,
            None => return Err(invalid(item_id, "unit_price", None)),
        };

        let pack_size = self.optional_quantity(
            item_id,
            "pack_size",
            row.pack_size.as_ref(),
            self.defaults.pack_size,
            issues,
        )?;
        let min_order_quantity = self.optional_quantity(
            item_id,
            "min_order_quantity",
            row.min_order_quantity.as_ref(),
            self.defaults.min_order_quantity,
            issues,
        )?;
        let lead_time_days = self.optional_quantity(
            item_id,
            "lead_time_days",
            row.lead_time_days.as_ref(),
            u64::from(self.defaults.lead_time_days),
            issues,
        )?;
        let lead_time_days = u32::try_from(lead_time_days)
            .map_err(|_| invalid(item_id, "lead_time_days", row.lead_time_days.as_ref()))?;

        Ok(CatalogEntry {
            item_id: item_id.to_string(),
            product_name: Self::name_or(
                item_id,
                "product_name",
                row.product_name.as_deref(),
                item_id,
                issues,
            ),
            unit_price,
            pack_size: Self::checked_pack_size(item_id, pack_size, issues),
            min_order_quantity,
            supplier_id: supplier_id.to_string(),
            supplier_name: Self::name_or(
                item_id,
                "supplier_name",
                row.supplier_name.as_deref(),
                supplier_id,
                issues,
            ),
            lead_time_days,
        })
    }

    /// 名稱缺漏時改用ID，並記錄資料品質問題
    fn name_or(
        item_id: &str,
        field: &'static str,
        name: Option<&str>,
        fallback: &str,
        issues: &mut Vec<RunIssue>,
    ) -> String {
        if let Some(name) = name {
            return name.to_string();
        }
        issues.push(RunIssue::from(DataQualityError::MissingName {
            item_id: item_id.to_string(),
            field,
            fallback: fallback.to_string(),
        }));
        fallback.to_string()
    }

    fn optional_quantity(
        &self,
        item_id: &str,
        field: &'static str,
        raw: Option<&RawValue>,
        default: u64,
        issues: &mut Vec<RunIssue>,
    ) -> Result<u64, CatalogIntegrityError> {
        match raw {
            None => {
                issues.push(RunIssue::from(DataQualityError::MissingField {
                    item_id: item_id.to_string(),
                    field,
                    default,
                }));
                Ok(default)
            }
            Some(value) => value.to_quantity().ok_or_else(|| invalid(item_id, field, raw)),
        }
    }

    fn checked_pack_size(item_id: &str, pack_size: u64, issues: &mut Vec<RunIssue>) -> u64 {
        if pack_size >= 1 {
            return pack_size;
        }
        issues.push(RunIssue::from(DataQualityError::PackSizeRaised {
            item_id: item_id.to_string(),
            raw: pack_size.to_string(),
        }));
        1
    }
}

fn invalid(item_id: &str, field: &'static str, raw: Option<&RawValue>) -> CatalogIntegrityError {
    CatalogIntegrityError::InvalidCatalogField {
        item_id: item_id.to_string(),
        field,
        raw: raw.map_or_else(|| "null".to_string(), RawValue::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replen_core::{Issue, Severity};
    use rust_decimal::Decimal;

    fn product(item_id: &str, pack_size: u64) -> ProductRecord {
        ProductRecord::new(item_id.to_string(), format!("Product {item_id}"), Decimal::new(150, 2))
            .with_pack_size(pack_size)
    }

    fn link(item_id: &str, supplier_id: &str, primary: bool) -> SupplierLink {
        let link = SupplierLink::primary(
            item_id.to_string(),
            supplier_id.to_string(),
            format!("Supplier {supplier_id}"),
            3,
        );
        SupplierLink {
            is_primary: primary,
            ..link
        }
    }

    fn joined_row(item_id: &str, supplier_id: &str) -> JoinedCatalogRow {
        JoinedCatalogRow {
            item_id: Some(item_id.to_string()),
            product_name: Some(format!("Product {item_id}")),
            unit_price: Some(RawValue::Float(2.5)),
            pack_size: Some(RawValue::Integer(6)),
            min_order_quantity: Some(RawValue::Integer(0)),
            supplier_id: Some(supplier_id.to_string()),
            supplier_name: Some(format!("Supplier {supplier_id}")),
            lead_time_days: Some(RawValue::Integer(2)),
        }
    }

    #[test]
    fn test_join_single_primary() {
        let products = vec![product("SKU000002", 12), product("SKU000001", 6)];
        let links = vec![
            link("SKU000001", "SUP001", true),
            link("SKU000001", "SUP002", false),
            link("SKU000002", "SUP002", true),
        ];

        let resolved = CatalogJoiner::default().join(&products, &links);
        let catalog = resolved.value;

        assert!(resolved.issues.is_empty());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("SKU000001").unwrap().supplier_id, "SUP001");
        // 保持商品輸入順序
        let order: Vec<_> = catalog.iter().map(|entry| entry.item_id.as_str()).collect();
        assert_eq!(order, vec!["SKU000002", "SKU000001"]);
    }

    #[test]
    fn test_multiple_primaries_excluded() {
        let products = vec![product("SKU000001", 1)];
        let links = vec![
            link("SKU000001", "SUP001", true),
            link("SKU000001", "SUP002", true),
        ];

        let resolved = CatalogJoiner::default().join(&products, &links);

        assert!(resolved.value.get("SKU000001").is_none());
        assert!(resolved.value.is_excluded("SKU000001"));
        assert!(matches!(
            &resolved.issues[0].issue,
            Issue::CatalogIntegrity(CatalogIntegrityError::MultiplePrimarySuppliers { supplier_ids, .. })
                if supplier_ids == &vec!["SUP001".to_string(), "SUP002".to_string()]
        ));
    }

    #[test]
    fn test_no_primary_excluded() {
        let products = vec![product("SKU000001", 1)];
        let links = vec![link("SKU000001", "SUP001", false)];

        let resolved = CatalogJoiner::default().join(&products, &links);

        assert!(resolved.value.is_empty());
        assert!(resolved.issues[0].is_exclusion());
    }

    #[test]
    fn test_duplicate_product_excluded_once() {
        let products = vec![product("SKU000001", 1), product("SKU000001", 2)];
        let links = vec![link("SKU000001", "SUP001", true)];

        let resolved = CatalogJoiner::default().join(&products, &links);

        assert!(resolved.value.is_empty());
        assert_eq!(resolved.issues.len(), 1);
    }

    #[test]
    fn test_zero_pack_size_raised() {
        let products = vec![product("SKU000001", 0)];
        let links = vec![link("SKU000001", "SUP001", true)];

        let resolved = CatalogJoiner::default().join(&products, &links);

        assert_eq!(resolved.value.get("SKU000001").unwrap().pack_size, 1);
        assert!(matches!(
            resolved.issues[0].issue,
            Issue::DataQuality(DataQualityError::PackSizeRaised { .. })
        ));
    }

    #[test]
    fn test_joined_rows() {
        let mut sparse = joined_row("SKU000002", "SUP002");
        sparse.pack_size = None;
        sparse.min_order_quantity = None;
        sparse.lead_time_days = None;
        let mut inexact = joined_row("SKU000003", "SUP003");
        inexact.unit_price = Some(RawValue::Float(2.49));

        let rows = vec![joined_row("SKU000001", "SUP001"), sparse, inexact];
        let resolved = CatalogJoiner::default().from_joined_rows(&rows);
        let catalog = resolved.value;

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("SKU000001").unwrap().unit_price, Decimal::new(25, 1));
        let sparse = catalog.get("SKU000002").unwrap();
        assert_eq!(sparse.pack_size, 1);
        assert_eq!(sparse.min_order_quantity, 0);
        assert_eq!(sparse.lead_time_days, 7);
        assert_eq!(resolved.issues.len(), 3);

        // 浮點價格不得帶入二進位尾數
        let inexact = catalog.get("SKU000003").unwrap();
        assert_eq!(inexact.unit_price, Decimal::new(249, 2));
        assert_eq!(inexact.unit_price * Decimal::from(15u64), Decimal::new(3735, 2));
    }

    #[test]
    fn test_joined_row_missing_names_recorded() {
        let mut row = joined_row("SKU000001", "SUP001");
        row.product_name = None;
        row.supplier_name = None;

        let resolved = CatalogJoiner::default().from_joined_rows(&[row]);
        let entry = resolved.value.get("SKU000001").unwrap();

        assert_eq!(entry.product_name, "SKU000001");
        assert_eq!(entry.supplier_name, "SUP001");
        assert_eq!(resolved.issues.len(), 2);
        assert!(resolved.issues.iter().all(|issue| issue.severity == Severity::Info));
        assert!(matches!(
            &resolved.issues[0].issue,
            Issue::DataQuality(DataQualityError::MissingName { field: "product_name", fallback, .. })
                if fallback == "SKU000001"
        ));
    }

    #[test]
    fn test_joined_rows_duplicate_item_is_ambiguous() {
        let rows = vec![
            joined_row("SKU000001", "SUP001"),
            joined_row("SKU000002", "SUP001"),
            joined_row("SKU000001", "SUP003"),
        ];

        let resolved = CatalogJoiner::default().from_joined_rows(&rows);

        assert_eq!(resolved.value.len(), 1);
        assert!(resolved.value.is_excluded("SKU000001"));
        assert_eq!(resolved.issues.len(), 1);
    }

    #[test]
    fn test_joined_row_invalid_price_excluded() {
        let mut row = joined_row("SKU000001", "SUP001");
        row.unit_price = Some(RawValue::from("N/A"));
        let mut missing_supplier = joined_row("SKU000002", "SUP001");
        missing_supplier.supplier_id = None;

        let resolved = CatalogJoiner::default().from_joined_rows(&[row, missing_supplier]);

        assert!(resolved.value.is_empty());
        assert!(matches!(
            resolved.issues[0].issue,
            Issue::CatalogIntegrity(CatalogIntegrityError::InvalidCatalogField { field: "unit_price", .. })
        ));
        assert!(matches!(
            resolved.issues[1].issue,
            Issue::CatalogIntegrity(CatalogIntegrityError::NoPrimarySupplier { .. })
        ));
    }
}
