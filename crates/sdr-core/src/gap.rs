//! GAP 分析結果模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Period, ProductKey, Result, SdrError};

/// 滿足狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    /// 可用量足以覆蓋需求
    Fulfilled,
    /// 缺貨
    Shortage,
}

impl FulfillmentStatus {
    /// 依缺口數量判定（缺口 >= 0 視為滿足）
    pub fn from_gap(gap_quantity: Decimal) -> Self {
        if gap_quantity >= Decimal::ZERO {
            FulfillmentStatus::Fulfilled
        } else {
            FulfillmentStatus::Shortage
        }
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentStatus::Fulfilled => f.write_str("Fulfilled"),
            FulfillmentStatus::Shortage => f.write_str("Shortage"),
        }
    }
}

/// GAP 明細（每個產品 × 期間一行）
///
/// 欄位順序即匯出欄位順序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRow {
    /// 產品鍵
    pub product_key: ProductKey,

    /// 期間
    pub period: Period,

    /// 期初庫存（上期結轉的盈餘，>= 0）
    pub begin_inventory: Decimal,

    /// 本期供應
    pub supply_in_period: Decimal,

    /// 可用總量 = 期初庫存 + 本期供應
    pub total_available: Decimal,

    /// 本期需求
    pub total_demand_qty: Decimal,

    /// 缺口 = 可用總量 - 本期需求（負數為缺貨）
    pub gap_quantity: Decimal,

    /// 滿足率（%）；本期無需求時為 100
    pub fulfillment_rate_percent: Decimal,

    /// 滿足狀態
    pub fulfillment_status: FulfillmentStatus,
}

impl GapRow {
    /// 由期初庫存、本期供應與需求計算一行
    ///
    /// 數值超出 `Decimal` 範圍時回傳 `QuantityOverflow`。
    pub fn compute(
        product_key: ProductKey,
        period: Period,
        begin_inventory: Decimal,
        supply_in_period: Decimal,
        total_demand_qty: Decimal,
    ) -> Result<Self> {
        let overflow = || SdrError::QuantityOverflow(format!("{} @ {}", product_key, period));

        let total_available = begin_inventory
            .checked_add(supply_in_period)
            .ok_or_else(overflow)?;
        let gap_quantity = total_available
            .checked_sub(total_demand_qty)
            .ok_or_else(overflow)?;
        let fulfillment_rate_percent = if total_demand_qty > Decimal::ZERO {
            fulfillment_rate(total_available, total_demand_qty).ok_or_else(overflow)?
        } else {
            Decimal::ONE_HUNDRED
        };

        Ok(Self {
            product_key,
            period,
            begin_inventory,
            supply_in_period,
            total_available,
            total_demand_qty,
            gap_quantity,
            fulfillment_rate_percent,
            fulfillment_status: FulfillmentStatus::from_gap(gap_quantity),
        })
    }

    /// 結轉到下一期的數量（只結轉正盈餘）
    pub fn carry_out(&self) -> Decimal {
        self.gap_quantity.max(Decimal::ZERO)
    }

    /// 是否缺貨
    pub fn is_shortage(&self) -> bool {
        self.gap_quantity < Decimal::ZERO
    }
}

/// 滿足率 = 可用量 / 需求 × 100
///
/// 先乘後除以保留精度；乘積溢位時改為先除後乘。
fn fulfillment_rate(available: Decimal, demand: Decimal) -> Option<Decimal> {
    Decimal::ONE_HUNDRED
        .checked_mul(available)
        .and_then(|v| v.checked_div(demand))
        .or_else(|| {
            available
                .checked_div(demand)
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        })
}

/// 加總數量，溢位時回傳 `QuantityOverflow`
pub fn checked_sum<I>(values: I, context: &str) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v)
            .ok_or_else(|| SdrError::QuantityOverflow(context.to_string()))
    })
}
