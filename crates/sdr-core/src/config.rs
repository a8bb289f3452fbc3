//! GAP 分析配置模型

use serde::{Deserialize, Serialize};

use crate::{DemandSource, Granularity, Result, SdrError, SupplySource};

/// GAP 分析參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// 期間粒度
    pub granularity: Granularity,

    /// 只輸出缺貨行（gap_quantity < 0）
    pub shortage_only: bool,

    /// 納入計算的需求來源
    pub demand_sources: Vec<DemandSource>,

    /// 納入計算的供應來源
    pub supply_sources: Vec<SupplySource>,

    /// 是否排除已過期庫存
    pub exclude_expired_inventory: bool,

    /// 是否補齊最早與最晚期間之間的空白期間
    /// - false: 期間軸只包含出現過需求或供應的期間（預設）
    /// - true: 期間軸連續，中間無活動的期間也會輸出並結轉
    pub contiguous_axis: bool,

    /// 產品數量達到此門檻時，逐產品掃描改用並行計算
    pub parallel_threshold: usize,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Weekly,
            shortage_only: false,
            demand_sources: DemandSource::ALL.to_vec(),
            supply_sources: SupplySource::ALL.to_vec(),
            exclude_expired_inventory: true,
            contiguous_axis: false,
            parallel_threshold: 256,
        }
    }
}

impl GapConfig {
    /// 創建新的 GAP 配置
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    /// 從 JSON 文字載入配置（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置只顯示缺貨
    pub fn with_shortage_only(mut self, shortage_only: bool) -> Self {
        self.shortage_only = shortage_only;
        self
    }

    /// 建構器模式：設置需求來源
    pub fn with_demand_sources(mut self, sources: Vec<DemandSource>) -> Self {
        self.demand_sources = sources;
        self
    }

    /// 建構器模式：設置供應來源
    pub fn with_supply_sources(mut self, sources: Vec<SupplySource>) -> Self {
        self.supply_sources = sources;
        self
    }

    /// 建構器模式：設置是否排除過期庫存
    pub fn with_exclude_expired_inventory(mut self, exclude: bool) -> Self {
        self.exclude_expired_inventory = exclude;
        self
    }

    /// 建構器模式：設置是否使用連續期間軸
    pub fn with_contiguous_axis(mut self, contiguous: bool) -> Self {
        self.contiguous_axis = contiguous;
        self
    }

    /// 建構器模式：設置並行門檻
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.demand_sources.is_empty() {
            return Err(SdrError::InvalidConfig("至少需要一個需求來源".to_string()));
        }
        if self.supply_sources.is_empty() {
            return Err(SdrError::InvalidConfig("至少需要一個供應來源".to_string()));
        }
        if self.parallel_threshold == 0 {
            return Err(SdrError::InvalidConfig("並行門檻必須大於 0".to_string()));
        }
        Ok(())
    }

    /// 需求來源是否被選取
    pub fn includes_demand(&self, source: DemandSource) -> bool {
        self.demand_sources.contains(&source)
    }

    /// 供應來源是否被選取
    pub fn includes_supply(&self, source: SupplySource) -> bool {
        self.supply_sources.contains(&source)
    }
}
