//! GAP 投影主計算器

use chrono::NaiveDate;
use rayon::prelude::*;
use sdr_core::{
    DemandRecord, GapConfig, GapRow, Granularity, InventoryLot, ProductKey, SupplyRecord,
};
use std::collections::BTreeSet;

use crate::aggregation::QuantityIndex;
use crate::bucketing::PeriodBucketer;
use crate::carry_forward::CarryForwardCalculator;
use crate::sources::SourceSelection;
use crate::{filter_shortages, GapResult, GapWarning};

/// GAP 投影引擎
///
/// 無狀態：每次呼叫都從當前需求/供應快照完整重算。
pub struct GapProjectionEngine {
    config: GapConfig,
}

impl GapProjectionEngine {
    /// 創建新的引擎
    pub fn new(config: GapConfig) -> Self {
        Self { config }
    }

    /// 以預設配置和指定粒度投影
    ///
    /// 回傳所有產品 × 期間的 GAP 明細；產品間依產品鍵排序，產品內依時間排序。
    /// 數量超出 `Decimal` 範圍時回傳 `QuantityOverflow`。
    pub fn project(
        demand: &[DemandRecord],
        supply: &[SupplyRecord],
        granularity: Granularity,
    ) -> sdr_core::Result<Vec<GapRow>> {
        let engine = Self::new(GapConfig::new(granularity));
        Ok(engine.project_records(demand, supply)?.rows)
    }

    /// 主計算入口：來源篩選 → 投影 → 缺貨篩選
    pub fn run(
        &self,
        demand: Vec<DemandRecord>,
        supply: Vec<SupplyRecord>,
        lots: Vec<InventoryLot>,
        today: NaiveDate,
    ) -> sdr_core::Result<GapResult> {
        self.config.validate()?;

        let selected = SourceSelection::new(&self.config, today).select(demand, supply, lots);
        tracing::debug!(
            "來源篩選後：需求 {} 筆，供應 {} 筆，過期批次 {} 筆",
            selected.demand.len(),
            selected.supply.len(),
            selected.expired_lots
        );

        let mut result = self.project_records(&selected.demand, &selected.supply)?;
        result.expired_lots = selected.expired_lots;
        if selected.expired_lots > 0 {
            result.add_warning(GapWarning::info(format!(
                "已排除 {} 筆過期庫存批次",
                selected.expired_lots
            )));
        }

        if self.config.shortage_only {
            result.rows = filter_shortages(result.rows);
        }

        Ok(result)
    }

    /// 對已篩選的記錄執行投影
    pub fn project_records(
        &self,
        demand: &[DemandRecord],
        supply: &[SupplyRecord],
    ) -> sdr_core::Result<GapResult> {
        let granularity = self.config.granularity;
        tracing::info!(
            "開始 GAP 計算：需求 {} 筆，供應 {} 筆，粒度 {}",
            demand.len(),
            supply.len(),
            granularity
        );

        let start_time = std::time::Instant::now();
        let mut result = GapResult::empty();

        // Step 1-2: 分桶並按 (產品, 期間) 彙總
        tracing::debug!("Step 1: 時間分桶與彙總");
        let demand_index = QuantityIndex::from_demand(demand, granularity)?;
        let supply_index = QuantityIndex::from_supply(supply, granularity)?;

        result.dropped_demand = demand_index.dropped();
        result.dropped_supply = supply_index.dropped();
        if result.dropped_demand > 0 {
            tracing::warn!("{} 筆需求缺少日期，未納入計算", result.dropped_demand);
            result.add_warning(GapWarning::warning(format!(
                "{} 筆需求缺少日期，未納入計算",
                result.dropped_demand
            )));
        }
        if result.dropped_supply > 0 {
            tracing::warn!("{} 筆供應缺少日期，未納入計算", result.dropped_supply);
            result.add_warning(GapWarning::warning(format!(
                "{} 筆供應缺少日期，未納入計算",
                result.dropped_supply
            )));
        }

        // Step 3: 共用期間軸
        tracing::debug!("Step 2: 建立期間軸");
        let axis = PeriodBucketer::build_axis(
            demand_index.periods().chain(supply_index.periods()),
            self.config.contiguous_axis,
        )?;
        tracing::debug!("期間數量: {}", axis.len());

        // Step 4: 產品集合
        let products: Vec<ProductKey> = demand_index
            .products()
            .chain(supply_index.products())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        tracing::debug!("產品數量: {}", products.len());

        // Step 5: 逐產品結轉掃描（產品之間互相獨立）
        tracing::debug!("Step 3: 逐產品結轉掃描");
        let scan = |key: &ProductKey| {
            CarryForwardCalculator::scan(key, &axis, &demand_index, &supply_index)
        };
        let per_product: Vec<Vec<GapRow>> = if products.len() >= self.config.parallel_threshold {
            tracing::debug!("使用並行掃描");
            products.par_iter().map(scan).collect::<sdr_core::Result<_>>()?
        } else {
            products.iter().map(scan).collect::<sdr_core::Result<_>>()?
        };

        result.rows = per_product.into_iter().flatten().collect();
        result.periods = axis;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("GAP 計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "明細 {} 行，缺貨 {} 行",
            result.rows.len(),
            result.shortage_count()
        );

        Ok(result)
    }

    /// 獲取配置引用
    pub fn config(&self) -> &GapConfig {
        &self.config
    }
}
