//! 資料來源篩選
//!
//! 在呼叫引擎之前，依配置篩選需求/供應來源，並把庫存批次轉為供應。

use chrono::NaiveDate;
use sdr_core::{DemandRecord, GapConfig, InventoryLot, SupplyRecord, SupplySource};

/// 來源篩選結果
#[derive(Debug, Clone, Default)]
pub struct SelectedInputs {
    /// 選取的需求
    pub demand: Vec<DemandRecord>,
    /// 選取的供應（含庫存批次轉換）
    pub supply: Vec<SupplyRecord>,
    /// 因過期而排除的庫存批次數
    pub expired_lots: usize,
}

/// 來源篩選器
pub struct SourceSelection<'a> {
    config: &'a GapConfig,
    today: NaiveDate,
}

impl<'a> SourceSelection<'a> {
    /// 創建篩選器（`today` 作為庫存參考日與過期判斷基準）
    pub fn new(config: &'a GapConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// 篩選需求來源
    pub fn select_demand(&self, demand: Vec<DemandRecord>) -> Vec<DemandRecord> {
        demand
            .into_iter()
            .filter(|d| self.config.includes_demand(d.source))
            .collect()
    }

    /// 篩選供應來源
    pub fn select_supply(&self, supply: Vec<SupplyRecord>) -> Vec<SupplyRecord> {
        supply
            .into_iter()
            .filter(|s| self.config.includes_supply(s.source))
            .collect()
    }

    /// 把庫存批次轉為供應
    ///
    /// 未選取庫存來源時回傳空集合；回傳值第二項為排除的過期批次數。
    pub fn inventory_supply(&self, lots: Vec<InventoryLot>) -> (Vec<SupplyRecord>, usize) {
        if !self.config.includes_supply(SupplySource::Inventory) {
            return (Vec::new(), 0);
        }

        let mut expired = 0;
        let supply = lots
            .into_iter()
            .filter(|lot| {
                let keep = !(self.config.exclude_expired_inventory && lot.is_expired(self.today));
                if !keep {
                    expired += 1;
                }
                keep
            })
            .map(|lot| lot.into_supply(self.today))
            .collect();

        (supply, expired)
    }

    /// 一次完成所有篩選
    pub fn select(
        &self,
        demand: Vec<DemandRecord>,
        supply: Vec<SupplyRecord>,
        lots: Vec<InventoryLot>,
    ) -> SelectedInputs {
        let mut selected_supply = self.select_supply(supply);
        let (inventory, expired_lots) = self.inventory_supply(lots);
        selected_supply.extend(inventory);

        SelectedInputs {
            demand: self.select_demand(demand),
            supply: selected_supply,
            expired_lots,
        }
    }
}
