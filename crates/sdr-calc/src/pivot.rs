//! 樞紐檢視（產品 × 期間）
//!
//! GAP 明細、需求、供應三種檢視共用同一套分桶與彙總邏輯。

use rust_decimal::Decimal;
use sdr_core::{
    checked_sum, DemandRecord, GapRow, Granularity, Period, ProductKey, SdrError, SupplyRecord,
};
use std::collections::{BTreeMap, HashMap};

use crate::aggregation::QuantityIndex;
use crate::bucketing::PeriodBucketer;

/// 樞紐表的一列
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    /// 產品鍵
    pub product_key: ProductKey,
    /// 依期間欄位順序排列的數值（缺少的格子為 0）
    pub values: Vec<Decimal>,
}

impl PivotRow {
    /// 整列合計
    pub fn total(&self) -> sdr_core::Result<Decimal> {
        checked_sum(self.values.iter().copied(), &self.product_key.to_string())
    }

    /// 是否有任一負值
    pub fn has_negative(&self) -> bool {
        self.values.iter().any(|v| *v < Decimal::ZERO)
    }
}

/// GAP 樞紐檢視（值 = gap_quantity）
#[derive(Debug, Clone, PartialEq)]
pub struct GapPivot {
    /// 期間欄位（已排序）
    pub periods: Vec<Period>,
    /// 產品列（依產品鍵排序）
    pub rows: Vec<PivotRow>,
}

impl GapPivot {
    /// 從 GAP 明細建立樞紐表
    ///
    /// 欄位為 `axis` 與明細中出現的期間的聯集；同一格多行時加總。
    pub fn from_rows(rows: &[GapRow], axis: &[Period]) -> sdr_core::Result<Self> {
        let periods = PeriodBucketer::build_axis(
            axis.iter().copied().chain(rows.iter().map(|r| r.period)),
            false,
        )?;
        let column: HashMap<Period, usize> =
            periods.iter().enumerate().map(|(i, p)| (*p, i)).collect();

        let mut grouped: BTreeMap<&ProductKey, Vec<Decimal>> = BTreeMap::new();
        for row in rows {
            let values = grouped
                .entry(&row.product_key)
                .or_insert_with(|| vec![Decimal::ZERO; periods.len()]);
            if let Some(&i) = column.get(&row.period) {
                values[i] = values[i].checked_add(row.gap_quantity).ok_or_else(|| {
                    SdrError::QuantityOverflow(format!("{} @ {}", row.product_key, row.period))
                })?;
            }
        }

        let rows = grouped
            .into_iter()
            .map(|(key, values)| PivotRow {
                product_key: key.clone(),
                values,
            })
            .collect();

        Ok(Self { periods, rows })
    }

    /// 只保留任一期間缺貨的產品
    pub fn shortages_only(mut self) -> Self {
        self.rows.retain(PivotRow::has_negative);
        self
    }

    /// 期間欄位標籤
    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(Period::label).collect()
    }

    /// 查詢單一格
    pub fn value(&self, product_key: &ProductKey, period: &Period) -> Option<Decimal> {
        let col = self.periods.iter().position(|p| p == period)?;
        self.rows
            .iter()
            .find(|r| &r.product_key == product_key)
            .map(|r| r.values[col])
    }
}

/// 需求或供應的期間數量樞紐檢視（值 = 數量合計）
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodQuantityPivot {
    /// 期間欄位（已排序）
    pub periods: Vec<Period>,
    /// 產品列（依產品鍵排序）
    pub rows: Vec<PivotRow>,
    /// 各期間所有產品合計
    pub column_totals: Vec<Decimal>,
    /// 缺少日期而未納入的記錄數
    pub dropped: usize,
}

impl PeriodQuantityPivot {
    /// 需求檢視
    pub fn demand(records: &[DemandRecord], granularity: Granularity) -> sdr_core::Result<Self> {
        Self::from_index(QuantityIndex::from_demand(records, granularity)?)
    }

    /// 供應檢視
    pub fn supply(records: &[SupplyRecord], granularity: Granularity) -> sdr_core::Result<Self> {
        Self::from_index(QuantityIndex::from_supply(records, granularity)?)
    }

    fn from_index(index: QuantityIndex) -> sdr_core::Result<Self> {
        let periods = PeriodBucketer::build_axis(index.periods(), false)?;

        let mut products: Vec<&ProductKey> = index.products().collect();
        products.sort();

        let rows = products
            .into_iter()
            .map(|key| PivotRow {
                product_key: key.clone(),
                values: periods.iter().map(|p| index.get(key, p)).collect(),
            })
            .collect();
        let column_totals = periods
            .iter()
            .map(|p| index.period_total(p))
            .collect::<sdr_core::Result<_>>()?;

        Ok(Self {
            periods,
            rows,
            column_totals,
            dropped: index.dropped(),
        })
    }

    /// 只保留總量大於 0 的產品（數量非負，等同任一格大於 0）
    pub fn nonzero_only(mut self) -> Self {
        self.rows.retain(|r| r.values.iter().any(|v| *v > Decimal::ZERO));
        self
    }

    /// 期間欄位標籤
    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(Period::label).collect()
    }

    /// 所有期間總量
    pub fn grand_total(&self) -> sdr_core::Result<Decimal> {
        checked_sum(self.column_totals.iter().copied(), "grand total")
    }
}
