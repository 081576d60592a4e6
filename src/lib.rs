//! # Replen
//!
//! 每日補貨計算：由客戶需求、庫存快照與商品／供應商主檔計算各物料的補貨量，
//! 依包裝與最小訂購量取整後，分組為各供應商的採購訂單。
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use replen::{JsonDirectorySource, DirectoryEmitter, JsonLinesAuditSink, ReplenishmentCalculator};
//!
//! replen::logging::init();
//!
//! let source = JsonDirectorySource::new("data");
//! let mut emitter = DirectoryEmitter::new("supplier_orders");
//! let mut audit = JsonLinesAuditSink::new("audit");
//! let date = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
//!
//! let report = ReplenishmentCalculator::default()
//!     .run(&source, date, &mut emitter, &mut audit)
//!     .unwrap();
//! println!("排除物料 {} 個", report.excluded_count());
//! ```

pub mod logging;

pub use replen_calc::{
    CatalogJoiner, DemandAggregator, NetDemandCalculator, NoActionReason, OrderQuantityRounder,
    PipelineStage, ReplenishmentCalculator, ReplenishmentPlan, Resolved, RunFailure, RunOutcome,
    RunReport, RunSummary, StockResolver, SupplierOrderGrouper,
};
pub use replen_core::{
    AuditRecord, CalculationDetails, CatalogEntry, CatalogInput, DemandInput, DemandRecord,
    InputSet, InputSource, OrderEmitter, OrderLine, PersistenceSink, ReplenError,
    ReplenishmentConfig, RunIssue, Severity, StaticSource, StockRecord, SupplierOrderBatch,
};
pub use replen_io::{DirectoryEmitter, JsonDirectorySource, JsonLinesAuditSink, MemorySink};
