//! 需求彙總

use std::collections::HashMap;

use replen_core::raw::present_id;
use replen_core::{
    AggregatedDemandRow, DataQualityError, DemandInput, DemandRecord, InputSet,
    MalformedQuantityPolicy, RawOrderLine, RawValue, RunIssue,
};

use crate::Resolved;

/// 物料需求對照表
pub type DemandMap = HashMap<String, DemandRecord>;

/// 需求彙總器
#[derive(Debug, Clone, Copy)]
pub struct DemandAggregator {
    policy: MalformedQuantityPolicy,
}

impl DemandAggregator {
    pub fn new(policy: MalformedQuantityPolicy) -> Self {
        Self { policy }
    }

    /// 依輸入形式彙總需求
    pub fn resolve(&self, input: &DemandInput) -> Resolved<DemandMap> {
        match input {
            DemandInput::OrderLines(lines) => self.aggregate(lines),
            DemandInput::Aggregated(rows) => self.from_aggregated(rows),
        }
    }

    /// 彙總客戶訂單明細
    ///
    /// 缺少物料ID的明細排除；數量無法解析時依 [`MalformedQuantityPolicy`] 處理。
    /// 總需求為 0 的物料不列入結果。
    pub fn aggregate(&self, lines: &[RawOrderLine]) -> Resolved<DemandMap> {
        let mut demands = DemandMap::new();
        let mut issues = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(item_id) = present_id(line.item_id.as_deref()) else {
                issues.push(RunIssue::from(DataQualityError::MissingItemId {
                    input: InputSet::Demand,
                    row: index + 1,
                }));
                continue;
            };

            let Some(quantity) = self.parse_quantity(item_id, "quantity", line.quantity.as_ref(), &mut issues)
            else {
                continue;
            };

            demands
                .entry(item_id.to_string())
                .or_insert_with(|| DemandRecord::empty(item_id.to_string()))
                .add_line(quantity);
        }

        tracing::debug!("訂單明細 {} 筆，彙總為 {} 個物料", lines.len(), demands.len());
        Resolved::new(Self::retain_positive(demands), issues)
    }

    /// 正規化已彙總的需求查詢結果，重複物料列相加並記錄
    pub fn from_aggregated(&self, rows: &[AggregatedDemandRow]) -> Resolved<DemandMap> {
        let mut demands = DemandMap::new();
        let mut issues = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let Some(item_id) = present_id(row.item_id.as_deref()) else {
                issues.push(RunIssue::from(DataQualityError::MissingItemId {
                    input: InputSet::Demand,
                    row: index + 1,
                }));
                continue;
            };

            let Some(total_demand) =
                self.parse_quantity(item_id, "total_demand", row.total_demand.as_ref(), &mut issues)
            else {
                continue;
            };

            let order_count = match row.order_count.as_ref() {
                None => 0,
                Some(raw) => raw.to_quantity().unwrap_or_else(|| {
                    issues.push(RunIssue::from(DataQualityError::MalformedQuantity {
                        item_id: item_id.to_string(),
                        field: "order_count",
                        raw: raw.to_string(),
                    }));
                    0
                }),
            };

            let record = DemandRecord::new(item_id.to_string(), total_demand, order_count);
            match demands.get_mut(item_id) {
                Some(existing) => {
                    existing.merge(&record);
                    issues.push(RunIssue::from(DataQualityError::DuplicateRow {
                        input: InputSet::Demand,
                        item_id: item_id.to_string(),
                    }));
                }
                None => {
                    demands.insert(item_id.to_string(), record);
                }
            }
        }

        Resolved::new(Self::retain_positive(demands), issues)
    }

    fn parse_quantity(
        &self,
        item_id: &str,
        field: &'static str,
        raw: Option<&RawValue>,
        issues: &mut Vec<RunIssue>,
    ) -> Option<u64> {
        if let Some(quantity) = raw.and_then(RawValue::to_quantity) {
            return Some(quantity);
        }

        issues.push(RunIssue::from(DataQualityError::MalformedQuantity {
            item_id: item_id.to_string(),
            field,
            raw: raw.map_or_else(|| "null".to_string(), RawValue::to_string),
        }));

        match self.policy {
            MalformedQuantityPolicy::Skip => None,
            MalformedQuantityPolicy::CoerceToZero => Some(0),
        }
    }

    fn retain_positive(mut demands: DemandMap) -> DemandMap {
        demands.retain(|_, demand| demand.has_demand());
        demands
    }
}

impl Default for DemandAggregator {
    fn default() -> Self {
        Self::new(MalformedQuantityPolicy::Skip)
    }
}
