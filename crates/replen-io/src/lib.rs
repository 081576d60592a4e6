//! # Replenishment I/O
//!
//! 檔案型的輸入來源與輸出端：JSON 目錄來源、供應商訂單檔案、稽核記錄

pub mod emitter;
pub mod sink;
pub mod source;

use std::path::{Path, PathBuf};

pub use emitter::DirectoryEmitter;
pub use sink::{JsonLinesAuditSink, MemorySink};
pub use source::JsonDirectorySource;

/// 檔案輸出入錯誤
///
/// 由呼叫端依情境轉換為 [`replen_core::ReplenError`]。
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("無法讀寫檔案 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON 格式錯誤 {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV 寫入錯誤 {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl FileError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 供應商ID中的 `/` 會被當成路徑分隔，改為 `_`
pub fn safe_file_id(id: &str) -> String {
    id.replace('/', "_")
}
