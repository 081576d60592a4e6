//! 訂單明細與稽核記錄寫入端

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use replen_core::{
    AuditRecord, OrderEmitter, OrderLine, PersistenceSink, ReplenError, Result, SupplierOrderBatch,
};
use serde::Serialize;

use crate::FileError;

/// 以 JSON Lines 追加寫入訂單明細與稽核記錄
///
/// 兩份檔案分開存放：`order_lines.jsonl` 與 `calculation_audit.jsonl`。
#[derive(Debug, Clone)]
pub struct JsonLinesAuditSink {
    dir: PathBuf,
}

impl JsonLinesAuditSink {
    pub const ORDER_LINES_FILE: &'static str = "order_lines.jsonl";
    pub const AUDIT_FILE: &'static str = "calculation_audit.jsonl";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn order_lines_path(&self) -> PathBuf {
        self.dir.join(Self::ORDER_LINES_FILE)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.dir.join(Self::AUDIT_FILE)
    }

    fn append<T: Serialize>(path: &Path, records: &[T]) -> std::result::Result<(), FileError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| FileError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(|e| FileError::json(path, e))?;
            writer.write_all(b"\n").map_err(|e| FileError::io(path, e))?;
        }
        writer.flush().map_err(|e| FileError::io(path, e))
    }

    fn write_all(
        &self,
        order_lines: &[OrderLine],
        audit_records: &[AuditRecord],
    ) -> std::result::Result<(), FileError> {
        fs::create_dir_all(&self.dir).map_err(|e| FileError::io(&self.dir, e))?;
        Self::append(&self.order_lines_path(), order_lines)?;
        Self::append(&self.audit_path(), audit_records)
    }
}

impl PersistenceSink for JsonLinesAuditSink {
    fn persist(&mut self, order_lines: &[OrderLine], audit_records: &[AuditRecord]) -> Result<()> {
        self.write_all(order_lines, audit_records)
            .map_err(|e| ReplenError::Persist(e.to_string()))?;
        tracing::debug!(
            "已寫入訂單明細 {} 筆、稽核記錄 {} 筆",
            order_lines.len(),
            audit_records.len()
        );
        Ok(())
    }
}

/// 記憶體內的輸出端，同時實作訂單輸出與持久化
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub batches: Vec<SupplierOrderBatch>,
    pub generated_at: Option<DateTime<Utc>>,
    pub order_lines: Vec<OrderLine>,
    pub audit_records: Vec<AuditRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty() && self.order_lines.is_empty() && self.audit_records.is_empty()
    }
}

impl OrderEmitter for MemorySink {
    fn emit(&mut self, batch: &SupplierOrderBatch, generated_at: DateTime<Utc>) -> Result<()> {
        self.generated_at = Some(generated_at);
        self.batches.push(batch.clone());
        Ok(())
    }
}

impl PersistenceSink for MemorySink {
    fn persist(&mut self, order_lines: &[OrderLine], audit_records: &[AuditRecord]) -> Result<()> {
        self.order_lines.extend_from_slice(order_lines);
        self.audit_records.extend_from_slice(audit_records);
        Ok(())
    }
}
