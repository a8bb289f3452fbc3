//! 需求模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ProductKey;

/// 需求來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandSource {
    /// 訂單確認（OC / 未出貨訂單）
    #[serde(rename = "OC")]
    OrderConfirmation,
    /// 客戶預測
    Forecast,
}

impl DemandSource {
    /// 所有需求來源
    pub const ALL: [DemandSource; 2] = [DemandSource::OrderConfirmation, DemandSource::Forecast];

    /// 來源標籤
    pub fn label(&self) -> &'static str {
        match self {
            DemandSource::OrderConfirmation => "OC",
            DemandSource::Forecast => "Forecast",
        }
    }

    /// 從來源標籤解析（不分大小寫）
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for DemandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 需求記錄（每筆需求明細一行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandRecord {
    /// 記錄ID
    pub id: Uuid,

    /// 產品鍵
    pub product_key: ProductKey,

    /// 需求日期（如預計交貨日 ETD）；缺失時不歸入任何期間
    pub demand_date: Option<NaiveDate>,

    /// 需求數量（非負）
    pub demand_quantity: Decimal,

    /// 需求來源
    pub source: DemandSource,
}

impl DemandRecord {
    /// 創建新的需求記錄
    ///
    /// 負數量視為 0。
    pub fn new(
        product_key: ProductKey,
        demand_quantity: Decimal,
        demand_date: NaiveDate,
        source: DemandSource,
    ) -> Self {
        Self::from_optional_date(product_key, demand_quantity, Some(demand_date), source)
    }

    /// 創建日期可能缺失的需求記錄（匯入邊界使用）
    pub fn from_optional_date(
        product_key: ProductKey,
        demand_quantity: Decimal,
        demand_date: Option<NaiveDate>,
        source: DemandSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_key,
            demand_date,
            demand_quantity: demand_quantity.max(Decimal::ZERO),
            source,
        }
    }

    /// 建構器模式：設置需求日期（可為空）
    pub fn with_demand_date(mut self, demand_date: Option<NaiveDate>) -> Self {
        self.demand_date = demand_date;
        self
    }

    /// 是否為客戶預測
    pub fn is_forecast(&self) -> bool {
        self.source == DemandSource::Forecast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_demand() {
        let demand = DemandRecord::new(
            ProductKey::from_code("PT-001"),
            Decimal::from(100),
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            DemandSource::OrderConfirmation,
        );

        assert_eq!(demand.product_key.pt_code, "PT-001");
        assert_eq!(demand.demand_quantity, Decimal::from(100));
        assert!(demand.demand_date.is_some());
        assert!(!demand.is_forecast());
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let demand = DemandRecord::new(
            ProductKey::from_code("PT-002"),
            Decimal::from(-5),
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            DemandSource::Forecast,
        )
        .with_demand_date(None);

        assert_eq!(demand.demand_quantity, Decimal::ZERO);
        assert!(demand.demand_date.is_none());
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(DemandSource::from_label("oc"), Some(DemandSource::OrderConfirmation));
        assert_eq!(DemandSource::from_label("Forecast"), Some(DemandSource::Forecast));
        assert_eq!(DemandSource::from_label("Backlog"), None);
    }
}
