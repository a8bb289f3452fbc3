//! # SDR Calculation Engine
//!
//! 供需 GAP 分析計算引擎（期間分桶、排序、庫存結轉、樞紐檢視）

pub mod aggregation;
pub mod bucketing;
pub mod calculator;
pub mod carry_forward;
pub mod ordering;
pub mod pivot;
pub mod sources;

// Re-export 主要類型
pub use aggregation::QuantityIndex;
pub use bucketing::PeriodBucketer;
pub use calculator::GapProjectionEngine;
pub use ordering::PeriodComparator;
pub use pivot::{GapPivot, PeriodQuantityPivot};
pub use sources::SourceSelection;

use sdr_core::{GapRow, Period};
use serde::Serialize;

/// GAP 計算結果
#[derive(Debug, Clone, Serialize)]
pub struct GapResult {
    /// GAP 明細
    pub rows: Vec<GapRow>,

    /// 共用期間軸（已排序）
    pub periods: Vec<Period>,

    /// 缺少日期而丟棄的需求筆數
    pub dropped_demand: usize,

    /// 缺少日期而丟棄的供應筆數
    pub dropped_supply: usize,

    /// 排除的過期庫存批次數
    pub expired_lots: usize,

    /// 警告信息
    pub warnings: Vec<GapWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl GapResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            periods: Vec::new(),
            dropped_demand: 0,
            dropped_supply: 0,
            expired_lots: 0,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: GapWarning) {
        self.warnings.push(warning);
    }

    /// 缺貨行數
    pub fn shortage_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_shortage()).count()
    }

    /// 轉為樞紐檢視（產品 × 期間 → 缺口）
    ///
    /// 欄位只取自 `rows`；只保留缺貨行時，沒有缺貨的期間不會成為欄位。
    pub fn pivot(&self) -> sdr_core::Result<GapPivot> {
        GapPivot::from_rows(&self.rows, &[])
    }
}

/// GAP 警告
#[derive(Debug, Clone, Serialize)]
pub struct GapWarning {
    pub message: String,
    pub severity: WarningSeverity,
}

impl GapWarning {
    pub fn new(message: String, severity: WarningSeverity) -> Self {
        Self { message, severity }
    }

    pub fn info(message: String) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    pub fn warning(message: String) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}

/// 只保留缺貨行（gap_quantity < 0）
pub fn filter_shortages(rows: Vec<GapRow>) -> Vec<GapRow> {
    rows.into_iter().filter(GapRow::is_shortage).collect()
}
