//! # Replenishment Core
//!
//! 補貨計算的核心資料模型、配置與錯誤類型

pub mod catalog;
pub mod config;
pub mod demand;
pub mod inventory;
pub mod issue;
pub mod output;
pub mod plan;
pub mod raw;
pub mod sink;
pub mod source;

// Re-export 主要類型
pub use catalog::{CatalogEntry, ProductRecord, SupplierLink};
pub use config::{
    CatalogDefaults, LineSort, MalformedQuantityPolicy, MoqPolicy, ReplenishmentConfig,
    StockDefaults,
};
pub use demand::DemandRecord;
pub use inventory::{StockOrigin, StockRecord};
pub use issue::{CatalogIntegrityError, DataQualityError, Issue, RunIssue, Severity};
pub use output::{AuditRecord, SupplierOrderDocument, TabularRow, TABULAR_COLUMNS};
pub use plan::{CalculationDetails, OrderLine, SupplierOrderBatch};
pub use raw::{AggregatedDemandRow, JoinedCatalogRow, RawOrderLine, RawStockRow, RawValue};
pub use sink::{OrderEmitter, PersistenceSink};
pub use source::{CatalogInput, DemandInput, InputSet, InputSource, StaticSource};

/// 補貨計算錯誤類型
///
/// 只有整份輸入無法取得或輸出端失敗才會出現在這裡；逐列、逐物料的問題
/// 以 [`RunIssue`] 記錄，不會中斷計算。
#[derive(Debug, thiserror::Error)]
pub enum ReplenError {
    #[error("上游資料不可用（{input}）: {reason}")]
    UpstreamUnavailable { input: InputSet, reason: String },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("供應商 {supplier_id} 批次總計不一致: {message}")]
    BatchIntegrity {
        supplier_id: String,
        message: String,
    },

    #[error("供應商 {supplier_id} 訂單輸出失敗: {message}")]
    Emit {
        supplier_id: String,
        message: String,
    },

    #[error("持久化失敗: {0}")]
    Persist(String),

    #[error("檔案讀寫錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReplenError {
    /// 建立上游不可用錯誤
    pub fn unavailable(input: InputSet, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            input,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplenError>;
