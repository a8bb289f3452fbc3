//! # SDR IO
//!
//! 資料匯入邊界（CSV → 型別化記錄）與 GAP 明細/樞紐表匯出

pub mod export;
pub mod loader;

// Re-export 主要類型
pub use export::{write_gap_pivot, write_gap_rows, write_quantity_pivot, GAP_COLUMNS};
pub use loader::{CsvLoader, LoadReport, Loaded};

/// IO 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("CSV 錯誤: {0}")]
    Csv(#[from] csv::Error),

    #[error("檔案錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error(transparent)]
    Core(#[from] sdr_core::SdrError),
}

pub type Result<T> = std::result::Result<T, IoError>;
