//! 補貨訂單模型

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 淨需求計算軌跡，隨訂單明細一起輸出與稽核
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub formula: String,
    pub demand: u64,
    pub safety_stock: u64,
    /// 淨可用庫存（可用 - 保留），可能為負
    pub net_available: i128,
    /// 代入數值後的算式，例如 `max(0, 52 + 10 - 40) = 22`
    pub calculation: String,
}

impl CalculationDetails {
    pub const FORMULA: &'static str =
        "max(0, demand + safety_stock - (available_stock - reserved_stock))";

    pub fn new(demand: u64, safety_stock: u64, net_available: i128, net_demand: u64) -> Self {
        Self {
            formula: Self::FORMULA.to_string(),
            demand,
            safety_stock,
            net_available,
            calculation: format!("max(0, {demand} + {safety_stock} - {net_available}) = {net_demand}"),
        }
    }
}

/// 訂單明細（補貨計算結果），建立後不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 明細ID，每筆明細唯一
    pub order_id: Uuid,

    /// 物料ID
    pub item_id: String,

    /// 品名
    pub product_name: String,

    /// 客戶需求
    pub demand: u64,

    /// 可用庫存
    pub available_stock: u64,

    /// 保留庫存
    pub reserved_stock: u64,

    /// 安全庫存
    pub safety_stock: u64,

    /// 淨需求
    pub net_demand: u64,

    /// 訂購數量（已依包裝與最小訂購量調整）
    pub order_quantity: u64,

    /// 包裝數量
    pub pack_size: u64,

    /// 單價
    pub unit_price: Decimal,

    /// 明細金額 = 單價 × 訂購數量
    pub total_price: Decimal,

    /// 供應商ID
    pub supplier_id: String,

    /// 供應商名稱
    pub supplier_name: String,

    /// 交期（天）
    pub lead_time_days: u32,

    /// 計算時間
    pub computed_at: DateTime<Utc>,

    pub calculation_details: CalculationDetails,
}

impl OrderLine {
    /// 檢查明細金額是否與單價、數量一致
    pub fn is_priced_consistently(&self) -> bool {
        self.total_price == self.unit_price * Decimal::from(self.order_quantity)
    }

    /// 預計到貨日（下單日加上交期）
    pub fn expected_delivery(&self, order_date: NaiveDate) -> Option<NaiveDate> {
        order_date.checked_add_days(chrono::Days::new(u64::from(self.lead_time_days)))
    }
}

/// 單一供應商的採購批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrderBatch {
    /// 供應商ID
    pub supplier_id: String,

    /// 供應商名稱
    pub supplier_name: String,

    /// 目標日期
    pub target_date: NaiveDate,

    /// 訂單明細
    pub order_lines: Vec<OrderLine>,

    /// 明細筆數
    pub total_items: usize,

    /// 批次總金額
    pub total_value: Decimal,
}

impl SupplierOrderBatch {
    /// 創建空的批次
    pub fn new(supplier_id: String, supplier_name: String, target_date: NaiveDate) -> Self {
        Self {
            supplier_id,
            supplier_name,
            target_date,
            order_lines: Vec::new(),
            total_items: 0,
            total_value: Decimal::ZERO,
        }
    }

    /// 加入訂單明細並更新總計
    pub fn push(&mut self, line: OrderLine) {
        self.total_value += line.total_price;
        self.order_lines.push(line);
        self.total_items = self.order_lines.len();
    }

    /// 檢查總計是否與明細一致
    pub fn totals_match(&self) -> bool {
        let recomputed: Decimal = self.order_lines.iter().map(|line| line.total_price).sum();
        self.total_items == self.order_lines.len()
            && self.total_value == recomputed
            && self.order_lines.iter().all(OrderLine::is_priced_consistently)
    }

    /// 批次訂購總數量
    pub fn total_quantity(&self) -> u64 {
        self.order_lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.order_quantity))
    }
}

/// 測試用的訂單明細樣本
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures {
    use super::*;

    pub fn order_line(item_id: &str, supplier_id: &str, quantity: u64, unit_price: Decimal) -> OrderLine {
        OrderLine {
            order_id: Uuid::new_v4(),
            item_id: item_id.to_string(),
            product_name: format!("Product {item_id}"),
            demand: quantity,
            available_stock: 0,
            reserved_stock: 0,
            safety_stock: 0,
            net_demand: quantity,
            order_quantity: quantity,
            pack_size: 1,
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            supplier_id: supplier_id.to_string(),
            supplier_name: format!("Supplier {supplier_id}"),
            lead_time_days: 3,
            computed_at: DateTime::<Utc>::UNIX_EPOCH,
            calculation_details: CalculationDetails::new(quantity, 0, 0, quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::order_line;
    use super::*;

    #[test]
    fn test_batch_totals() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let mut batch = SupplierOrderBatch::new("SUP001".to_string(), "Dairy Co".to_string(), date);

        batch.push(order_line("SKU000001", "SUP001", 24, Decimal::new(150, 2)));
        batch.push(order_line("SKU000002", "SUP001", 10, Decimal::new(99, 2)));

        assert_eq!(batch.total_items, 2);
        assert_eq!(batch.total_value, Decimal::new(4590, 2));
        assert_eq!(batch.total_quantity(), 34);
        assert!(batch.totals_match());
    }

    #[test]
    fn test_detect_tampered_total() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let mut batch = SupplierOrderBatch::new("SUP001".to_string(), "Dairy Co".to_string(), date);
        batch.push(order_line("SKU000001", "SUP001", 24, Decimal::ONE));

        batch.total_value = Decimal::from(999);
        assert!(!batch.totals_match());
    }

    #[test]
    fn test_calculation_details() {
        let details = CalculationDetails::new(52, 10, 40, 22);
        assert_eq!(details.calculation, "max(0, 52 + 10 - 40) = 22");
        assert_eq!(details.formula, CalculationDetails::FORMULA);

        // 保留量大於可用量時淨可用為負
        let details = CalculationDetails::new(5, 0, -20, 25);
        assert_eq!(details.calculation, "max(0, 5 + 0 - -20) = 25");
    }

    #[test]
    fn test_expected_delivery() {
        let line = order_line("SKU000001", "SUP001", 1, Decimal::ONE);
        let date = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();

        assert_eq!(
            line.expected_delivery(date),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
    }
}
