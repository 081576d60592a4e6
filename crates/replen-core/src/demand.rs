//! 需求模型

use serde::{Deserialize, Serialize};

/// 目標日期的單一物料需求彙總
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// 物料ID
    pub item_id: String,

    /// 總需求數量
    pub total_demand: u64,

    /// 訂單明細筆數
    pub order_count: u64,
}

impl DemandRecord {
    /// 創建新的需求彙總
    pub fn new(item_id: String, total_demand: u64, order_count: u64) -> Self {
        Self {
            item_id,
            total_demand,
            order_count,
        }
    }

    /// 創建空的需求彙總（尚未累加任何明細）
    pub fn empty(item_id: String) -> Self {
        Self::new(item_id, 0, 0)
    }

    /// 累加一筆訂單明細
    pub fn add_line(&mut self, quantity: u64) {
        self.total_demand = self.total_demand.saturating_add(quantity);
        self.order_count = self.order_count.saturating_add(1);
    }

    /// 合併另一筆同物料的彙總
    pub fn merge(&mut self, other: &DemandRecord) {
        self.total_demand = self.total_demand.saturating_add(other.total_demand);
        self.order_count = self.order_count.saturating_add(other.order_count);
    }

    /// 是否有實際需求
    pub fn has_demand(&self) -> bool {
        self.total_demand > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_lines() {
        let mut demand = DemandRecord::empty("SKU000001".to_string());
        assert!(!demand.has_demand());

        demand.add_line(3);
        demand.add_line(4);

        assert_eq!(demand.total_demand, 7);
        assert_eq!(demand.order_count, 2);
        assert!(demand.has_demand());
    }

    #[test]
    fn test_merge() {
        let mut demand = DemandRecord::new("SKU000002".to_string(), 10, 2);
        demand.merge(&DemandRecord::new("SKU000002".to_string(), 5, 1));

        assert_eq!(demand.total_demand, 15);
        assert_eq!(demand.order_count, 3);
    }
}
