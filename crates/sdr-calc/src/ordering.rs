//! 期間排序

use sdr_core::{Granularity, Period, Result, SdrError};
use std::cmp::Ordering;

/// 期間比較器
///
/// 提供同粒度期間（或期間標籤）的全序。無法解析或粒度不一致一律回傳錯誤，
/// 不會把無法排序的期間推到任意位置。
pub struct PeriodComparator;

impl PeriodComparator {
    /// 比較兩個期間
    pub fn compare(a: &Period, b: &Period) -> Result<Ordering> {
        a.try_cmp(b)
    }

    /// 比較兩個期間標籤
    pub fn compare_labels(granularity: Granularity, a: &str, b: &str) -> Result<Ordering> {
        let a = Period::parse(granularity, a)?;
        let b = Period::parse(granularity, b)?;
        Self::compare(&a, &b)
    }

    /// 就地排序期間（要求全部同粒度）
    pub fn sort_periods(periods: &mut [Period]) -> Result<()> {
        if let Some(first) = periods.first() {
            let expected = first.granularity();
            if let Some(other) = periods.iter().find(|p| p.granularity() != expected) {
                return Err(SdrError::GranularityMismatch {
                    expected,
                    found: other.granularity(),
                });
            }
        }
        periods.sort_unstable();
        Ok(())
    }

    /// 依時間排序期間標籤
    ///
    /// 回傳排序後的標準標籤；任一標籤無法解析即整體失敗。
    pub fn sort_labels<S: AsRef<str>>(
        granularity: Granularity,
        labels: &[S],
    ) -> Result<Vec<String>> {
        let mut periods = labels
            .iter()
            .map(|label| Period::parse(granularity, label.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::sort_periods(&mut periods)?;
        Ok(periods.iter().map(Period::label).collect())
    }
}
