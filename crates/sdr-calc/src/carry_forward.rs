//! 庫存結轉計算

use rust_decimal::Decimal;
use sdr_core::{GapRow, Period, ProductKey};

use crate::aggregation::QuantityIndex;

/// 結轉計算器
pub struct CarryForwardCalculator;

impl CarryForwardCalculator {
    /// 單一產品沿期間軸依序掃描
    ///
    /// 第一期期初庫存為 0；每期結束後只有正盈餘結轉到下一期，
    /// 缺口不會以負債形式往後傳遞。
    ///
    /// # 參數
    /// * `axis` - 已依時間排序的共用期間軸
    pub fn scan(
        product_key: &ProductKey,
        axis: &[Period],
        demand: &QuantityIndex,
        supply: &QuantityIndex,
    ) -> sdr_core::Result<Vec<GapRow>> {
        let mut rows = Vec::with_capacity(axis.len());
        let mut carry_forward_qty = Decimal::ZERO;

        for period in axis {
            let row = GapRow::compute(
                product_key.clone(),
                *period,
                carry_forward_qty,
                supply.get(product_key, period),
                demand.get(product_key, period),
            )?;

            carry_forward_qty = row.carry_out();
            rows.push(row);
        }

        Ok(rows)
    }
}
