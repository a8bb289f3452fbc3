//! 時間分桶

use chrono::NaiveDate;
use sdr_core::{Granularity, Period};

use crate::ordering::PeriodComparator;

/// 期間分桶器
pub struct PeriodBucketer;

impl PeriodBucketer {
    /// 將日期映射到期間標籤
    pub fn bucket(date: NaiveDate, granularity: Granularity) -> Period {
        Period::from_date(date, granularity)
    }

    /// 分桶可能缺失的日期
    ///
    /// 缺失日期不歸入任何期間，回傳 `None`，由呼叫方計入丟棄數。
    pub fn bucket_opt(date: Option<NaiveDate>, granularity: Granularity) -> Option<Period> {
        date.map(|d| Self::bucket(d, granularity))
    }

    /// 建立共用期間軸
    ///
    /// 合併所有觀察到的期間、去重後依時間排序。
    /// `contiguous` 為 true 時補齊最早與最晚期間之間的空白期間。
    pub fn build_axis(
        periods: impl IntoIterator<Item = Period>,
        contiguous: bool,
    ) -> sdr_core::Result<Vec<Period>> {
        let mut axis: Vec<Period> = periods.into_iter().collect();
        PeriodComparator::sort_periods(&mut axis)?;
        axis.dedup();

        if contiguous {
            axis = Self::fill_gaps(&axis);
        }

        Ok(axis)
    }

    /// 補齊排序後期間序列中的空白期間
    fn fill_gaps(sorted: &[Period]) -> Vec<Period> {
        let (first, last) = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };

        let mut filled = Vec::with_capacity(sorted.len());
        let mut current = Some(first);
        while let Some(period) = current {
            if period > last {
                break;
            }
            filled.push(period);
            current = period.next();
        }
        filled
    }
}
