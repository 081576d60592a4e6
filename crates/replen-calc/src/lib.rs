//! # Replenishment Calculation Engine
//!
//! 補貨計算引擎：需求彙總、庫存解析、目錄聯結、淨需求、訂購取整與供應商分組

pub mod calculator;
pub mod catalog;
pub mod demand;
pub mod grouping;
pub mod lot_sizing;
pub mod netting;
pub mod stock;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use replen_core::{AuditRecord, Issue, OrderLine, ReplenError, RunIssue, SupplierOrderBatch};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

// Re-export 主要類型
pub use calculator::ReplenishmentCalculator;
pub use catalog::{CatalogJoiner, JoinedCatalog};
pub use demand::{DemandAggregator, DemandMap};
pub use grouping::SupplierOrderGrouper;
pub use lot_sizing::OrderQuantityRounder;
pub use netting::{NetDemandCalculator, NetRequirement};
pub use stock::{StockBook, StockResolver};

/// 解析結果與過程中記錄的問題
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub issues: Vec<RunIssue>,
}

impl<T> Resolved<T> {
    pub fn new(value: T, issues: Vec<RunIssue>) -> Self {
        Self { value, issues }
    }
}

/// 計算流程階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AggregatingDemand,
    ResolvingStock,
    JoiningCatalog,
    Calculating,
    Grouping,
    Emitting,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::AggregatingDemand => "彙總需求",
            PipelineStage::ResolvingStock => "解析庫存",
            PipelineStage::JoiningCatalog => "聯結目錄",
            PipelineStage::Calculating => "計算訂購量",
            PipelineStage::Grouping => "供應商分組",
            PipelineStage::Emitting => "輸出訂單",
            PipelineStage::Done => "完成",
            PipelineStage::Failed => "失敗",
        };
        f.write_str(name)
    }
}

/// 不需補貨的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoActionReason {
    /// 目標日期沒有任何需求
    NoDemand,
    /// 有需求的物料都不在可採購目錄中
    NoOrderableItems,
    /// 所有淨需求皆為 0
    StockCoversDemand,
}

/// 計算結果：產生訂單，或明確表示不需補貨
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Orders(ReplenishmentPlan),
    NoActionRequired { reason: NoActionReason },
}

impl RunOutcome {
    /// 取得補貨計劃；不需補貨時為 `None`
    pub fn plan(&self) -> Option<&ReplenishmentPlan> {
        match self {
            RunOutcome::Orders(plan) => Some(plan),
            RunOutcome::NoActionRequired { .. } => None,
        }
    }

    pub fn is_no_action(&self) -> bool {
        matches!(self, RunOutcome::NoActionRequired { .. })
    }
}

/// 依供應商分組的補貨計劃
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplenishmentPlan {
    pub batches: Vec<SupplierOrderBatch>,
}

impl ReplenishmentPlan {
    /// 依批次順序走訪所有訂單明細
    pub fn order_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.batches.iter().flat_map(|batch| batch.order_lines.iter())
    }

    pub fn line_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.total_items).sum()
    }

    pub fn total_value(&self) -> Decimal {
        self.batches.iter().map(|batch| batch.total_value).sum()
    }

    pub fn batch(&self, supplier_id: &str) -> Option<&SupplierOrderBatch> {
        self.batches.iter().find(|batch| batch.supplier_id == supplier_id)
    }

    /// 每張訂單明細的計算稽核記錄
    pub fn audit_records(&self, calculation_date: NaiveDate) -> Vec<AuditRecord> {
        self.order_lines()
            .map(|line| AuditRecord::from_line(line, calculation_date))
            .collect()
    }
}

/// 計算摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 有需求的物料數
    pub demand_items: usize,
    /// 有需求且可採購的物料數
    pub orderable_items: usize,
    /// 產生訂單的物料數
    pub ordered_items: usize,
    /// 庫存足以支應、不需訂購的物料數
    pub covered_items: usize,
    /// 因目錄問題排除的物料數
    pub excluded_items: usize,
    /// 資料品質問題數
    pub data_quality_issues: usize,
}

/// 計算報告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub target_date: NaiveDate,
    pub computed_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub issues: Vec<RunIssue>,
    /// 依序經過的階段
    pub stages: Vec<PipelineStage>,
    pub summary: RunSummary,
    /// 計算耗時（毫秒）
    pub calculation_time_ms: u128,
}

impl RunReport {
    /// 被排除物料的問題
    pub fn exclusions(&self) -> impl Iterator<Item = &RunIssue> {
        self.issues.iter().filter(|issue| issue.is_exclusion())
    }

    pub fn excluded_count(&self) -> usize {
        self.exclusions().count()
    }

    /// 物料是否被排除
    pub fn is_excluded(&self, item_id: &str) -> bool {
        self.exclusions()
            .any(|issue| issue.item_id.as_deref() == Some(item_id))
    }

    pub fn plan(&self) -> Option<&ReplenishmentPlan> {
        self.outcome.plan()
    }

    pub fn final_stage(&self) -> Option<PipelineStage> {
        self.stages.last().copied()
    }

    pub(crate) fn summarize(issues: &[RunIssue], mut summary: RunSummary) -> RunSummary {
        summary.excluded_items = issues.iter().filter(|issue| issue.is_exclusion()).count();
        summary.data_quality_issues = issues
            .iter()
            .filter(|issue| matches!(issue.issue, Issue::DataQuality(_)))
            .count();
        summary
    }
}

/// 計算失敗：記錄失敗的階段與已收集的問題，不會產生任何輸出
#[derive(Debug, thiserror::Error)]
#[error("補貨計算 {run_id} 在「{stage}」階段失敗: {error}")]
pub struct RunFailure {
    pub run_id: Uuid,
    pub stage: PipelineStage,
    #[source]
    pub error: ReplenError,
    pub issues: Vec<RunIssue>,
}
