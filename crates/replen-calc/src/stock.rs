//! 庫存解析

use std::collections::HashMap;

use replen_core::raw::present_id;
use replen_core::{
    DataQualityError, InputSet, RawStockRow, RawValue, RunIssue, StockDefaults, StockOrigin,
    StockRecord,
};

use crate::Resolved;

/// 目標日期的庫存簿
#[derive(Debug, Clone)]
pub struct StockBook {
    records: HashMap<String, StockRecord>,
    defaults: StockDefaults,
}

impl StockBook {
    /// 取得快照中的庫存記錄
    pub fn get(&self, item_id: &str) -> Option<&StockRecord> {
        self.records.get(item_id)
    }

    /// 取得物料庫存；沒有快照列時回傳預設庫存（來源為 [`StockOrigin::Missing`]）
    pub fn resolve_for(&self, item_id: &str) -> StockRecord {
        self.records.get(item_id).cloned().unwrap_or_else(|| {
            StockRecord::from_defaults(item_id.to_string(), &self.defaults, StockOrigin::Missing)
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 庫存解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct StockResolver {
    defaults: StockDefaults,
}

impl StockResolver {
    pub fn new(defaults: StockDefaults) -> Self {
        Self { defaults }
    }

    /// 解析庫存快照
    ///
    /// 缺少的欄位以該欄位預設值補齊；任一欄位無法解析時整列改用預設庫存，
    /// 但仍保留該物料，讓後續訂單計算照常進行。
    pub fn resolve(&self, rows: &[RawStockRow]) -> Resolved<StockBook> {
        let mut records = HashMap::new();
        let mut issues = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let Some(item_id) = present_id(row.item_id.as_deref()) else {
                issues.push(RunIssue::from(DataQualityError::MissingItemId {
                    input: InputSet::Stock,
                    row: index + 1,
                }));
                continue;
            };

            let record = self.parse_row(item_id, row, &mut issues);
            if records.insert(item_id.to_string(), record).is_some() {
                issues.push(RunIssue::from(DataQualityError::DuplicateRow {
                    input: InputSet::Stock,
                    item_id: item_id.to_string(),
                }));
            }
        }

        tracing::debug!("庫存快照 {} 列，解析為 {} 個物料", rows.len(), records.len());
        Resolved::new(
            StockBook {
                records,
                defaults: self.defaults,
            },
            issues,
        )
    }

    fn parse_row(&self, item_id: &str, row: &RawStockRow, issues: &mut Vec<RunIssue>) -> StockRecord {
        let fields: [(&'static str, Option<&RawValue>, u64); 3] = [
            ("available_stock", row.available_stock.as_ref(), self.defaults.available_stock),
            ("reserved_stock", row.reserved_stock.as_ref(), self.defaults.reserved_stock),
            ("safety_stock", row.safety_stock.as_ref(), self.defaults.safety_stock),
        ];

        let mut values = [0u64; 3];
        let mut missing = Vec::new();

        for (slot, (field, raw, default)) in values.iter_mut().zip(fields) {
            match raw {
                None => {
                    *slot = default;
                    missing.push(DataQualityError::MissingField {
                        item_id: item_id.to_string(),
                        field,
                        default,
                    });
                }
                Some(raw) => match raw.to_quantity() {
                    Some(value) => *slot = value,
                    None => {
                        issues.push(RunIssue::from(DataQualityError::StockRowFallback {
                            item_id: item_id.to_string(),
                            field,
                            raw: raw.to_string(),
                        }));
                        return StockRecord::from_defaults(
                            item_id.to_string(),
                            &self.defaults,
                            StockOrigin::FallbackDefaults,
                        );
                    }
                },
            }
        }

        let origin = if missing.is_empty() {
            StockOrigin::Snapshot
        } else {
            StockOrigin::PartialDefaults
        };
        issues.extend(missing.into_iter().map(RunIssue::from));

        let [available_stock, reserved_stock, safety_stock] = values;
        StockRecord {
            item_id: item_id.to_string(),
            available_stock,
            reserved_stock,
            safety_stock,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replen_core::{Issue, Severity};

    #[test]
    fn test_resolve_snapshot() {
        let rows = vec![
            RawStockRow::new("SKU000001", 70, 0, 10),
            RawStockRow::new("SKU000002", 40, 5, 12),
        ];

        let resolved = StockResolver::default().resolve(&rows);
        let book = resolved.value;

        assert!(resolved.issues.is_empty());
        assert_eq!(book.len(), 2);
        assert_eq!(book.get("SKU000002").unwrap().reserved_stock, 5);
        assert_eq!(book.get("SKU000002").unwrap().origin, StockOrigin::Snapshot);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let rows = vec![RawStockRow {
            item_id: Some("SKU000001".to_string()),
            available_stock: Some(RawValue::Integer(30)),
            reserved_stock: None,
            safety_stock: None,
        }];

        let resolved = StockResolver::default().resolve(&rows);
        let stock = resolved.value.resolve_for("SKU000001");

        assert_eq!(stock.available_stock, 30);
        assert_eq!(stock.reserved_stock, 0);
        assert_eq!(stock.safety_stock, 10);
        assert_eq!(stock.origin, StockOrigin::PartialDefaults);
        assert_eq!(resolved.issues.len(), 2);
        assert!(resolved.issues.iter().all(|issue| issue.severity == Severity::Info));
    }

    #[test]
    fn test_malformed_row_falls_back_entirely() {
        let rows = vec![RawStockRow {
            item_id: Some("SKU000001".to_string()),
            available_stock: Some(RawValue::Integer(5)),
            reserved_stock: Some(RawValue::from("SKU000999")),
            safety_stock: None,
        }];

        let resolved = StockResolver::default().resolve(&rows);
        let stock = resolved.value.resolve_for("SKU000001");

        assert_eq!(stock.available_stock, 50);
        assert_eq!(stock.reserved_stock, 0);
        assert_eq!(stock.safety_stock, 10);
        assert_eq!(stock.origin, StockOrigin::FallbackDefaults);
        assert_eq!(resolved.issues.len(), 1);
        assert!(resolved.issues[0].message.contains("SKU000999"));
    }

    #[test]
    fn test_missing_row_uses_defaults() {
        let defaults = StockDefaults {
            available_stock: 7,
            reserved_stock: 1,
            safety_stock: 3,
        };
        let resolved = StockResolver::new(defaults).resolve(&[]);
        let stock = resolved.value.resolve_for("SKU000404");

        assert_eq!(stock.available_stock, 7);
        assert_eq!(stock.reserved_stock, 1);
        assert_eq!(stock.safety_stock, 3);
        assert_eq!(stock.origin, StockOrigin::Missing);
    }

    #[test]
    fn test_duplicate_row_last_wins() {
        let rows = vec![
            RawStockRow::new("SKU000001", 10, 0, 5),
            RawStockRow::new("SKU000001", 20, 0, 5),
            RawStockRow {
                item_id: None,
                ..RawStockRow::default()
            },
        ];

        let resolved = StockResolver::default().resolve(&rows);

        assert_eq!(resolved.value.get("SKU000001").unwrap().available_stock, 20);
        assert!(matches!(
            resolved.issues[0].issue,
            Issue::DataQuality(DataQualityError::DuplicateRow { .. })
        ));
        assert!(matches!(
            resolved.issues[1].issue,
            Issue::DataQuality(DataQualityError::MissingItemId { row: 3, .. })
        ));
    }
}
