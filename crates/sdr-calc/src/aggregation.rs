//! 按 (產品, 期間) 彙總數量

use rust_decimal::Decimal;
use sdr_core::{
    checked_sum, DemandRecord, Granularity, Period, ProductKey, SdrError, SupplyRecord,
};
use std::collections::{BTreeSet, HashMap};

use crate::bucketing::PeriodBucketer;

/// 數量索引
///
/// 以 (產品鍵, 期間) 為鍵預先彙總，掃描時為 O(1) 查詢。
#[derive(Debug, Clone, Default)]
pub struct QuantityIndex {
    quantities: HashMap<ProductKey, HashMap<Period, Decimal>>,
    periods: BTreeSet<Period>,
    dropped: usize,
}

impl QuantityIndex {
    /// 創建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 從需求記錄建立索引
    pub fn from_demand(
        records: &[DemandRecord],
        granularity: Granularity,
    ) -> sdr_core::Result<Self> {
        let mut index = Self::new();
        for record in records {
            index.add(
                &record.product_key,
                PeriodBucketer::bucket_opt(record.demand_date, granularity),
                record.demand_quantity,
            )?;
        }
        Ok(index)
    }

    /// 從供應記錄建立索引
    pub fn from_supply(
        records: &[SupplyRecord],
        granularity: Granularity,
    ) -> sdr_core::Result<Self> {
        let mut index = Self::new();
        for record in records {
            index.add(
                &record.product_key,
                PeriodBucketer::bucket_opt(record.supply_date, granularity),
                record.supply_quantity,
            )?;
        }
        Ok(index)
    }

    /// 累加一筆數量；期間缺失時計入丟棄數
    pub fn add(
        &mut self,
        product_key: &ProductKey,
        period: Option<Period>,
        quantity: Decimal,
    ) -> sdr_core::Result<()> {
        let Some(period) = period else {
            self.dropped += 1;
            return Ok(());
        };

        let cell = self
            .quantities
            .entry(product_key.clone())
            .or_default()
            .entry(period)
            .or_insert(Decimal::ZERO);
        *cell = cell.checked_add(quantity).ok_or_else(|| {
            SdrError::QuantityOverflow(format!("{} @ {}", product_key, period))
        })?;
        self.periods.insert(period);
        Ok(())
    }

    /// 查詢數量（無記錄為 0）
    pub fn get(&self, product_key: &ProductKey, period: &Period) -> Decimal {
        self.quantities
            .get(product_key)
            .and_then(|per_period| per_period.get(period))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 出現過的期間
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.periods.iter().copied()
    }

    /// 出現過的產品
    pub fn products(&self) -> impl Iterator<Item = &ProductKey> {
        self.quantities.keys()
    }

    /// 某產品各期間數量
    pub fn product_periods(&self, product_key: &ProductKey) -> Option<&HashMap<Period, Decimal>> {
        self.quantities.get(product_key)
    }

    /// 某期間所有產品的合計
    pub fn period_total(&self, period: &Period) -> sdr_core::Result<Decimal> {
        checked_sum(
            self.quantities
                .values()
                .filter_map(|per_period| per_period.get(period))
                .copied(),
            &period.label(),
        )
    }

    /// 因日期缺失而丟棄的記錄數
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// 索引是否為空
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}
