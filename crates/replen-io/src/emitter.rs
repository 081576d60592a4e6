//! 供應商訂單檔案輸出

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use replen_core::{
    OrderEmitter, ReplenError, Result, SupplierOrderBatch, SupplierOrderDocument, TabularRow,
    TABULAR_COLUMNS,
};

use crate::{safe_file_id, FileError};

/// 將每個供應商批次寫成 `supplier_{id}_{date}.json` 與 `.csv`
#[derive(Debug, Clone)]
pub struct DirectoryEmitter {
    output_dir: PathBuf,
    write_csv: bool,
    written: Vec<PathBuf>,
}

impl DirectoryEmitter {
    /// 創建輸出器；目錄在第一次輸出時建立
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_csv: true,
            written: Vec::new(),
        }
    }

    /// 建構器模式：只輸出 JSON 文件
    pub fn json_only(mut self) -> Self {
        self.write_csv = false;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 已寫出的檔案
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// 檔名主幹：`supplier_{id}_{date}`
    pub fn file_stem(supplier_id: &str, order_date: NaiveDate) -> String {
        format!("supplier_{}_{}", safe_file_id(supplier_id), order_date)
    }

    fn write_batch(
        &mut self,
        batch: &SupplierOrderBatch,
        generated_at: DateTime<Utc>,
    ) -> std::result::Result<(), FileError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| FileError::io(&self.output_dir, e))?;
        let stem = Self::file_stem(&batch.supplier_id, batch.target_date);

        let json_path = self.output_dir.join(format!("{stem}.json"));
        Self::write_document(&json_path, batch, generated_at)?;
        self.written.push(json_path);

        if self.write_csv {
            let csv_path = self.output_dir.join(format!("{stem}.csv"));
            Self::write_table(&csv_path, batch)?;
            self.written.push(csv_path);
        }

        Ok(())
    }

    fn write_document(
        path: &Path,
        batch: &SupplierOrderBatch,
        generated_at: DateTime<Utc>,
    ) -> std::result::Result<(), FileError> {
        let file = File::create(path).map_err(|e| FileError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        let document = SupplierOrderDocument::from_batch(batch, generated_at);
        serde_json::to_writer_pretty(&mut writer, &document).map_err(|e| FileError::json(path, e))?;
        writer.flush().map_err(|e| FileError::io(path, e))
    }

    fn write_table(path: &Path, batch: &SupplierOrderBatch) -> std::result::Result<(), FileError> {
        // 欄位順序由 TABULAR_COLUMNS 決定，沒有明細時也要有表頭
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| FileError::csv(path, e))?;
        writer
            .write_record(TABULAR_COLUMNS)
            .map_err(|e| FileError::csv(path, e))?;
        for row in TabularRow::rows_for(batch) {
            writer.serialize(row).map_err(|e| FileError::csv(path, e))?;
        }
        writer.flush().map_err(|e| FileError::io(path, e))
    }
}

impl OrderEmitter for DirectoryEmitter {
    fn emit(&mut self, batch: &SupplierOrderBatch, generated_at: DateTime<Utc>) -> Result<()> {
        self.write_batch(batch, generated_at).map_err(|e| ReplenError::Emit {
            supplier_id: batch.supplier_id.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!("供應商 {} 訂單檔案已寫入 {}", batch.supplier_id, self.output_dir.display());
        Ok(())
    }
}
