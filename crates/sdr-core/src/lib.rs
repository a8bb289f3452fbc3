//! # SDR Core
//!
//! 供需檢視（Supply-Demand Review）核心資料模型與類型定義

pub mod config;
pub mod demand;
pub mod gap;
pub mod inventory;
pub mod period;
pub mod product;
pub mod supply;

// Re-export 主要類型
pub use config::GapConfig;
pub use demand::{DemandRecord, DemandSource};
pub use gap::{checked_sum, FulfillmentStatus, GapRow};
pub use inventory::InventoryLot;
pub use period::{Granularity, Period};
pub use product::ProductKey;
pub use supply::{SupplyRecord, SupplySource};

/// SDR 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum SdrError {
    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("無法解析的期間標籤（{granularity}）: {label}")]
    InvalidPeriodLabel {
        granularity: Granularity,
        label: String,
    },

    #[error("期間粒度不一致: 預期 {expected}，實際 {found}")]
    GranularityMismatch {
        expected: Granularity,
        found: Granularity,
    },

    #[error("數量溢位: {0}")]
    QuantityOverflow(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdrError {
    /// 是否為期間排序錯誤（無法保證結轉順序，必須中止）
    pub fn is_period_ordering(&self) -> bool {
        matches!(
            self,
            SdrError::InvalidPeriodLabel { .. } | SdrError::GranularityMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SdrError>;
