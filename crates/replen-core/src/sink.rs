//! 輸出端介面

use chrono::{DateTime, Utc};

use crate::output::AuditRecord;
use crate::plan::{OrderLine, SupplierOrderBatch};
use crate::Result;

/// 供應商訂單輸出（結構化文件與平面表格）
pub trait OrderEmitter {
    fn emit(&mut self, batch: &SupplierOrderBatch, generated_at: DateTime<Utc>) -> Result<()>;
}

/// 訂單明細與計算稽核記錄的寫入端
pub trait PersistenceSink {
    fn persist(&mut self, order_lines: &[OrderLine], audit_records: &[AuditRecord]) -> Result<()>;
}
