//! 可恢復的資料問題
//!
//! 逐列的資料品質問題與逐物料的目錄完整性問題都不會中斷計算，
//! 而是彙整到計算報告中，並保留原始值以便稽核。

use serde::Serialize;

use crate::source::InputSet;

/// 資料品質問題（逐列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityError {
    #[error("{input}第 {row} 列缺少物料ID")]
    MissingItemId { input: InputSet, row: usize },

    #[error("物料 {item_id} 的 {field} 無法解析為非負整數: {raw}")]
    MalformedQuantity {
        item_id: String,
        field: &'static str,
        raw: String,
    },

    #[error("物料 {item_id} 缺少 {field}，採用預設值 {default}")]
    MissingField {
        item_id: String,
        field: &'static str,
        default: u64,
    },

    #[error("物料 {item_id} 缺少 {field}，改用 {fallback}")]
    MissingName {
        item_id: String,
        field: &'static str,
        fallback: String,
    },

    #[error("物料 {item_id} 的庫存列無法解析（{field} = {raw}），整列改用預設庫存")]
    StockRowFallback {
        item_id: String,
        field: &'static str,
        raw: String,
    },

    #[error("物料 {item_id} 沒有庫存快照，採用預設庫存")]
    StockRowMissing { item_id: String },

    #[error("物料 {item_id} 在{input}中重複出現")]
    DuplicateRow { input: InputSet, item_id: String },

    #[error("物料 {item_id} 的包裝數量 {raw} 小於 1，改為 1")]
    PackSizeRaised { item_id: String, raw: String },
}

impl DataQualityError {
    /// 相關物料ID
    pub fn item_id(&self) -> Option<&str> {
        match self {
            DataQualityError::MissingItemId { .. } => None,
            DataQualityError::MalformedQuantity { item_id, .. }
            | DataQualityError::MissingField { item_id, .. }
            | DataQualityError::MissingName { item_id, .. }
            | DataQualityError::StockRowFallback { item_id, .. }
            | DataQualityError::StockRowMissing { item_id }
            | DataQualityError::DuplicateRow { item_id, .. }
            | DataQualityError::PackSizeRaised { item_id, .. } => Some(item_id),
        }
    }

    fn severity(&self) -> Severity {
        match self {
            DataQualityError::MissingField { .. }
            | DataQualityError::MissingName { .. }
            | DataQualityError::PackSizeRaised { .. } => Severity::Info,
            DataQualityError::MalformedQuantity { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// 目錄完整性問題（逐物料）；該物料不會產生訂單
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogIntegrityError {
    #[error("物料 {item_id} 沒有主要供應商")]
    NoPrimarySupplier { item_id: String },

    #[error("物料 {item_id} 有多個主要供應商: {supplier_ids:?}")]
    MultiplePrimarySuppliers {
        item_id: String,
        supplier_ids: Vec<String>,
    },

    #[error("物料 {item_id} 有需求但不在商品目錄中")]
    NotInCatalog { item_id: String },

    #[error("物料 {item_id} 的商品主檔重複")]
    DuplicateProduct { item_id: String },

    #[error("物料 {item_id} 的目錄欄位 {field} 無效: {raw}")]
    InvalidCatalogField {
        item_id: String,
        field: &'static str,
        raw: String,
    },
}

impl CatalogIntegrityError {
    /// 相關物料ID
    pub fn item_id(&self) -> &str {
        match self {
            CatalogIntegrityError::NoPrimarySupplier { item_id }
            | CatalogIntegrityError::MultiplePrimarySuppliers { item_id, .. }
            | CatalogIntegrityError::NotInCatalog { item_id }
            | CatalogIntegrityError::DuplicateProduct { item_id }
            | CatalogIntegrityError::InvalidCatalogField { item_id, .. } => item_id,
        }
    }
}

/// 問題嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// 問題分類
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    DataQuality(DataQualityError),
    CatalogIntegrity(CatalogIntegrityError),
}

/// 計算過程中記錄的問題
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunIssue {
    pub severity: Severity,
    pub item_id: Option<String>,
    pub message: String,
    pub issue: Issue,
}

impl RunIssue {
    /// 是否為目錄完整性問題（代表物料被排除）
    pub fn is_exclusion(&self) -> bool {
        matches!(self.issue, Issue::CatalogIntegrity(_))
    }
}

impl From<DataQualityError> for RunIssue {
    fn from(error: DataQualityError) -> Self {
        Self {
            severity: error.severity(),
            item_id: error.item_id().map(str::to_string),
            message: error.to_string(),
            issue: Issue::DataQuality(error),
        }
    }
}

impl From<CatalogIntegrityError> for RunIssue {
    fn from(error: CatalogIntegrityError) -> Self {
        Self {
            severity: Severity::Warning,
            item_id: Some(error.item_id().to_string()),
            message: error.to_string(),
            issue: Issue::CatalogIntegrity(error),
        }
    }
}
