//! 供應模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ProductKey;

/// 供應來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplySource {
    /// 現有庫存（參考日 = 今天）
    Inventory,
    /// 在途到貨通知（參考日 = 到貨 ETA）
    #[serde(rename = "Pending CAN")]
    PendingCan,
    /// 未交採購單（參考日 = 備貨完成日）
    #[serde(rename = "Pending PO")]
    PendingPo,
}

impl SupplySource {
    /// 所有供應來源
    pub const ALL: [SupplySource; 3] = [
        SupplySource::Inventory,
        SupplySource::PendingCan,
        SupplySource::PendingPo,
    ];

    /// 來源標籤
    pub fn label(&self) -> &'static str {
        match self {
            SupplySource::Inventory => "Inventory",
            SupplySource::PendingCan => "Pending CAN",
            SupplySource::PendingPo => "Pending PO",
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

impl fmt::Display for SupplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 供應記錄（每筆供應明細一行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyRecord {
    /// 記錄ID
    pub id: Uuid,

    /// 產品鍵
    pub product_key: ProductKey,

    /// 可用日期；缺失時不歸入任何期間
    pub supply_date: Option<NaiveDate>,

    /// 供應數量（非負）
    pub supply_quantity: Decimal,

    /// 供應來源
    pub source: SupplySource,
}

impl SupplyRecord {
    /// 創建新的供應記錄
    ///
    /// 負數量視為 0。
    pub fn new(
        product_key: ProductKey,
        supply_quantity: Decimal,
        supply_date: NaiveDate,
        source: SupplySource,
    ) -> Self {
        Self::from_optional_date(product_key, supply_quantity, Some(supply_date), source)
    }

    /// 創建日期可能缺失的供應記錄（匯入邊界使用）
    pub fn from_optional_date(
        product_key: ProductKey,
        supply_quantity: Decimal,
        supply_date: Option<NaiveDate>,
        source: SupplySource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_key,
            supply_date,
            supply_quantity: supply_quantity.max(Decimal::ZERO),
            source,
        }
    }

    /// 建構器模式：設置可用日期（可為空）
    pub fn with_supply_date(mut self, supply_date: Option<NaiveDate>) -> Self {
        self.supply_date = supply_date;
        self
    }

    /// 是否為在途供應（尚未入庫）
    pub fn is_pending(&self) -> bool {
        self.source != SupplySource::Inventory
    }
}
