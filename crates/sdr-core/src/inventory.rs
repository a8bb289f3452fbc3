//! 庫存批次模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductKey, SupplyRecord, SupplySource};

/// 現有庫存批次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLot {
    /// 產品鍵
    pub product_key: ProductKey,

    /// 剩餘數量
    pub remaining_quantity: Decimal,

    /// 有效期限
    pub expiry_date: Option<NaiveDate>,

    /// 批號
    pub batch_no: Option<String>,
}

impl InventoryLot {
    /// 創建新的庫存批次
    pub fn new(product_key: ProductKey, remaining_quantity: Decimal) -> Self {
        Self {
            product_key,
            remaining_quantity: remaining_quantity.max(Decimal::ZERO),
            expiry_date: None,
            batch_no: None,
        }
    }

    /// 建構器模式：設置有效期限
    pub fn with_expiry_date(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// 建構器模式：設置批號
    pub fn with_batch_no(mut self, batch_no: String) -> Self {
        self.batch_no = Some(batch_no);
        self
    }

    /// 是否已過期（有效期限早於今天；無期限視為未過期）
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    /// 轉換為供應記錄（參考日 = 今天）
    pub fn into_supply(self, today: NaiveDate) -> SupplyRecord {
        SupplyRecord::new(
            self.product_key,
            self.remaining_quantity,
            today,
            SupplySource::Inventory,
        )
    }
}
