//! 輸出格式
//!
//! 每個供應商一份結構化文件與一份平面表格，另外每個物料一筆稽核記錄。
//! 編碼方式（JSON、CSV、資料庫列）由輸出端決定，這裡只定義欄位。

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::plan::{CalculationDetails, OrderLine, SupplierOrderBatch};

/// 平面表格欄位順序
pub const TABULAR_COLUMNS: [&str; 10] = [
    "item_id",
    "product_name",
    "demand",
    "available_stock",
    "safety_stock",
    "net_demand",
    "order_quantity",
    "pack_size",
    "unit_price",
    "total_price",
];

/// 供應商結構化訂單文件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierOrderDocument<'a> {
    pub supplier_id: &'a str,
    pub supplier_name: &'a str,
    pub order_date: NaiveDate,
    pub total_items: usize,
    pub total_value: Decimal,
    pub generated_at: DateTime<Utc>,
    pub items: &'a [OrderLine],
}

impl<'a> SupplierOrderDocument<'a> {
    /// 由批次建立文件
    pub fn from_batch(batch: &'a SupplierOrderBatch, generated_at: DateTime<Utc>) -> Self {
        Self {
            supplier_id: &batch.supplier_id,
            supplier_name: &batch.supplier_name,
            order_date: batch.target_date,
            total_items: batch.total_items,
            total_value: batch.total_value,
            generated_at,
            items: &batch.order_lines,
        }
    }
}

/// 平面表格列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularRow {
    pub item_id: String,
    pub product_name: String,
    pub demand: u64,
    pub available_stock: u64,
    pub safety_stock: u64,
    pub net_demand: u64,
    pub order_quantity: u64,
    pub pack_size: u64,
    /// 兩位小數
    pub unit_price: String,
    /// 兩位小數
    pub total_price: String,
}

impl TabularRow {
    pub fn from_line(line: &OrderLine) -> Self {
        Self {
            item_id: line.item_id.clone(),
            product_name: line.product_name.clone(),
            demand: line.demand,
            available_stock: line.available_stock,
            safety_stock: line.safety_stock,
            net_demand: line.net_demand,
            order_quantity: line.order_quantity,
            pack_size: line.pack_size,
            unit_price: format_money(line.unit_price),
            total_price: format_money(line.total_price),
        }
    }

    /// 由批次建立全部表格列
    pub fn rows_for(batch: &SupplierOrderBatch) -> Vec<Self> {
        batch.order_lines.iter().map(Self::from_line).collect()
    }
}

fn format_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// 計算稽核記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub order_id: Uuid,
    pub calculation_date: NaiveDate,
    pub item_id: String,
    pub total_demand: u64,
    pub available_stock: u64,
    pub net_demand: u64,
    pub final_order_quantity: u64,
    pub calculated_at: DateTime<Utc>,
    pub calculation_details: CalculationDetails,
}

impl AuditRecord {
    pub fn from_line(line: &OrderLine, calculation_date: NaiveDate) -> Self {
        Self {
            order_id: line.order_id,
            calculation_date,
            item_id: line.item_id.clone(),
            total_demand: line.demand,
            available_stock: line.available_stock,
            net_demand: line.net_demand,
            final_order_quantity: line.order_quantity,
            calculated_at: line.computed_at,
            calculation_details: line.calculation_details.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::order_line;

    fn batch() -> SupplierOrderBatch {
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let mut batch = SupplierOrderBatch::new("SUP001".to_string(), "Dairy Co".to_string(), date);
        batch.push(order_line("SKU000001", "SUP001", 24, Decimal::new(125, 2)));
        batch.push(order_line("SKU000002", "SUP001", 5, Decimal::from(2)));
        batch
    }

    #[test]
    fn test_document_fields() {
        let batch = batch();
        let document = SupplierOrderDocument::from_batch(&batch, DateTime::<Utc>::UNIX_EPOCH);
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["supplier_id"], "SUP001");
        assert_eq!(json["order_date"], "2025-12-02");
        assert_eq!(json["total_items"], 2);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["items"][0]["item_id"], "SKU000001");
        assert_eq!(
            json["items"][0]["calculation_details"]["calculation"],
            "max(0, 24 + 0 - 0) = 24"
        );
        assert_ne!(json["items"][0]["order_id"], json["items"][1]["order_id"]);
    }

    #[test]
    fn test_tabular_money_format() {
        let rows = TabularRow::rows_for(&batch());

        assert_eq!(rows[0].unit_price, "1.25");
        assert_eq!(rows[0].total_price, "30.00");
        assert_eq!(rows[1].unit_price, "2.00");
        assert_eq!(rows[1].total_price, "10.00");
    }

    #[test]
    fn test_audit_record() {
        let batch = batch();
        let record = AuditRecord::from_line(&batch.order_lines[0], batch.target_date);

        assert_eq!(record.order_id, batch.order_lines[0].order_id);
        assert_eq!(record.item_id, "SKU000001");
        assert_eq!(record.final_order_quantity, 24);
        assert_eq!(record.calculation_date, batch.target_date);
    }
}
