//! 依供應商分組

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDate;
use replen_core::{LineSort, OrderLine, SupplierOrderBatch};

/// 供應商訂單分組器
pub struct SupplierOrderGrouper;

impl SupplierOrderGrouper {
    /// 將訂單明細依供應商分組
    ///
    /// 批次依供應商首次出現的順序排列；每張明細恰好屬於一個批次。
    pub fn group(
        lines: Vec<OrderLine>,
        target_date: NaiveDate,
        sort: LineSort,
    ) -> Vec<SupplierOrderBatch> {
        let mut batches: Vec<SupplierOrderBatch> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for line in lines {
            let position = *positions.entry(line.supplier_id.clone()).or_insert_with(|| {
                batches.push(SupplierOrderBatch::new(
                    line.supplier_id.clone(),
                    line.supplier_name.clone(),
                    target_date,
                ));
                batches.len() - 1
            });
            batches[position].push(line);
        }

        for batch in &mut batches {
            Self::sort_lines(&mut batch.order_lines, sort);
        }

        tracing::debug!("分組完成：{} 個供應商批次", batches.len());
        batches
    }

    fn sort_lines(lines: &mut [OrderLine], sort: LineSort) {
        match sort {
            LineSort::Insertion => {}
            LineSort::ItemId => lines.sort_by(|a, b| a.item_id.cmp(&b.item_id)),
            LineSort::TotalValueDesc => lines.sort_by_key(|line| Reverse(line.total_price)),
        }
    }
}
