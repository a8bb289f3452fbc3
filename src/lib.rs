//! # SDR
//!
//! 供需 GAP 分析：需求與供應按期間分桶、逐期結轉庫存盈餘、計算缺口與滿足率。
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use sdr::{DemandRecord, DemandSource, GapProjectionEngine, Granularity, ProductKey};
//!
//! let demand = vec![DemandRecord::new(
//!     ProductKey::from_code("PT-001"),
//!     Decimal::from(100),
//!     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
//!     DemandSource::OrderConfirmation,
//! )];
//!
//! let rows = GapProjectionEngine::project(&demand, &[], Granularity::Weekly).unwrap();
//! assert_eq!(rows[0].period.label(), "Week 01 - 2025");
//! assert!(rows[0].is_shortage());
//! ```

pub use sdr_calc::{
    filter_shortages, GapPivot, GapProjectionEngine, GapResult, GapWarning, PeriodBucketer,
    PeriodComparator, PeriodQuantityPivot, QuantityIndex, SourceSelection, WarningSeverity,
};
pub use sdr_core::{
    DemandRecord, DemandSource, FulfillmentStatus, GapConfig, GapRow, Granularity, InventoryLot,
    Period, ProductKey, Result, SdrError, SupplyRecord, SupplySource,
};
pub use sdr_io::{CsvLoader, IoError, LoadReport, Loaded};

pub mod io {
    //! 匯入/匯出
    pub use sdr_io::export::*;
    pub use sdr_io::loader::{parse_date, parse_quantity};
}
