//! 期間模型
//!
//! 期間以 (粒度, 年, 子期間序號) 的值類型表示，只在邊界才轉為顯示標籤。
//! 排序為原生的整數/元組比較，不依賴字串解析。

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Result, SdrError};

/// 月份英文縮寫（固定表，不受語系影響）
const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 期間粒度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// 每日
    Daily,
    /// 每週（ISO 8601 週）
    #[default]
    Weekly,
    /// 每月
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Granularity {
    type Err = SdrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Granularity::Daily),
            "weekly" | "week" | "w" => Ok(Granularity::Weekly),
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            other => Err(SdrError::InvalidConfig(format!("未知的期間粒度: {}", other))),
        }
    }
}

/// 期間
///
/// 同一粒度內的衍生排序即為時間順序：
/// - `Daily` 依日期
/// - `Weekly` 依 (ISO 週年, 週次)
/// - `Monthly` 依 (年, 月)
///
/// 不同粒度之間的衍生排序沒有意義，需要檢查時使用 [`Period::try_cmp`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// 單日
    Daily(NaiveDate),
    /// ISO 週（year 為 ISO 週年）
    Weekly { year: i32, week: u32 },
    /// 月份
    Monthly { year: i32, month: u32 },
}

impl Period {
    /// 將日期映射到指定粒度的期間
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Period::Daily(date),
            Granularity::Weekly => {
                let iso = date.iso_week();
                Period::Weekly {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Granularity::Monthly => Period::Monthly {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// 建立經過驗證的 ISO 週期間
    pub fn weekly(year: i32, week: u32) -> Result<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .map(|_| Period::Weekly { year, week })
            .ok_or_else(|| SdrError::InvalidPeriodLabel {
                granularity: Granularity::Weekly,
                label: format!("Week {:02} - {}", week, year),
            })
    }

    /// 建立經過驗證的月份期間
    pub fn monthly(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Period::Monthly { year, month })
            .ok_or_else(|| SdrError::InvalidPeriodLabel {
                granularity: Granularity::Monthly,
                label: format!("{}-{:02}", year, month),
            })
    }

    /// 期間粒度
    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Daily(_) => Granularity::Daily,
            Period::Weekly { .. } => Granularity::Weekly,
            Period::Monthly { .. } => Granularity::Monthly,
        }
    }

    /// 期間的第一天（週為週一）
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            Period::Daily(date) => Some(date),
            Period::Weekly { year, week } => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon),
            Period::Monthly { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
        }
    }

    /// 下一個期間（同粒度）
    pub fn next(&self) -> Option<Period> {
        match *self {
            Period::Daily(date) => date.succ_opt().map(Period::Daily),
            Period::Weekly { .. } => self
                .start_date()?
                .checked_add_signed(Duration::weeks(1))
                .map(|d| Period::from_date(d, Granularity::Weekly)),
            Period::Monthly { year, month } => {
                if month >= 12 {
                    Some(Period::Monthly {
                        year: year + 1,
                        month: 1,
                    })
                } else {
                    Some(Period::Monthly {
                        year,
                        month: month + 1,
                    })
                }
            }
        }
    }

    /// 帶粒度檢查的比較
    ///
    /// 粒度不同時回傳 `GranularityMismatch`，不會猜測位置。
    pub fn try_cmp(&self, other: &Period) -> Result<std::cmp::Ordering> {
        if self.granularity() != other.granularity() {
            return Err(SdrError::GranularityMismatch {
                expected: self.granularity(),
                found: other.granularity(),
            });
        }
        Ok(self.cmp(other))
    }

    /// 顯示標籤
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// 從顯示標籤解析期間
    ///
    /// 支援：
    /// - Daily: `2025-01-06`
    /// - Weekly: `Week 02 - 2025`（亦接受 `W2 - 2025`）
    /// - Monthly: `Jan 2025`（縮寫不分大小寫）
    pub fn parse(granularity: Granularity, label: &str) -> Result<Period> {
        let invalid = || SdrError::InvalidPeriodLabel {
            granularity,
            label: label.to_string(),
        };
        let text = label.trim();

        match granularity {
            Granularity::Daily => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Period::Daily)
                .map_err(|_| invalid()),
            Granularity::Weekly => {
                let (week_part, year_part) = text.split_once('-').ok_or_else(invalid)?;
                let week_part = week_part.trim();
                let week_digits = week_part
                    .strip_prefix("Week")
                    .or_else(|| week_part.strip_prefix('W'))
                    .ok_or_else(invalid)?
                    .trim();
                let week: u32 = week_digits.parse().map_err(|_| invalid())?;
                let year: i32 = year_part.trim().parse().map_err(|_| invalid())?;
                Period::weekly(year, week).map_err(|_| invalid())
            }
            Granularity::Monthly => {
                let mut parts = text.split_whitespace();
                let (abbr, year) = match (parts.next(), parts.next(), parts.next()) {
                    (Some(abbr), Some(year), None) => (abbr, year),
                    _ => return Err(invalid()),
                };
                let month = MONTH_ABBR
                    .iter()
                    .position(|m| m.eq_ignore_ascii_case(abbr))
                    .ok_or_else(invalid)? as u32
                    + 1;
                let year: i32 = year.parse().map_err(|_| invalid())?;
                Period::monthly(year, month).map_err(|_| invalid())
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Period::Daily(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Weekly { year, week } => write!(f, "Week {:02} - {}", week, year),
            Period::Monthly { year, month } => {
                let abbr = MONTH_ABBR
                    .get(month.saturating_sub(1) as usize)
                    .copied()
                    .unwrap_or("???");
                write!(f, "{} {}", abbr, year)
            }
        }
    }
}
