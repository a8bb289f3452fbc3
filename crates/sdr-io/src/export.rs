//! GAP 明細與樞紐表匯出（CSV）

use csv::Writer;
use rust_decimal::{Decimal, RoundingStrategy};
use sdr_calc::pivot::PivotRow;
use sdr_calc::{GapPivot, PeriodQuantityPivot};
use sdr_core::GapRow;
use std::io::Write;

use crate::Result;

/// GAP 明細匯出欄位（產品鍵就地展開為四欄，其餘依 GapRow 欄位順序）
pub const GAP_COLUMNS: [&str; 12] = [
    "pt_code",
    "product_name",
    "package_size",
    "standard_uom",
    "period",
    "begin_inventory",
    "supply_in_period",
    "total_available",
    "total_demand_qty",
    "gap_quantity",
    "fulfillment_rate_percent",
    "fulfillment_status",
];

/// 滿足率匯出時保留的小數位（四捨五入）
const RATE_DECIMALS: u32 = 1;

/// 匯出 GAP 明細
pub fn write_gap_rows<W: Write>(writer: W, rows: &[GapRow]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(GAP_COLUMNS)?;

    for row in rows {
        wtr.write_record([
            row.product_key.pt_code.clone(),
            row.product_key.product_name.clone(),
            row.product_key.package_size.clone(),
            row.product_key.standard_uom.clone(),
            row.period.label(),
            qty(row.begin_inventory),
            qty(row.supply_in_period),
            qty(row.total_available),
            qty(row.total_demand_qty),
            qty(row.gap_quantity),
            rate(row.fulfillment_rate_percent),
            row.fulfillment_status.to_string(),
        ])?;
    }

    wtr.flush()?;
    tracing::debug!("已匯出 {} 行 GAP 明細", rows.len());
    Ok(())
}

/// 匯出 GAP 樞紐表（列 = 產品，欄 = 期間，值 = 缺口）
pub fn write_gap_pivot<W: Write>(writer: W, pivot: &GapPivot) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(pivot_header(pivot.labels()))?;
    for row in &pivot.rows {
        wtr.write_record(pivot_record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 匯出需求/供應數量樞紐表，最後一列為各期間合計
pub fn write_quantity_pivot<W: Write>(writer: W, pivot: &PeriodQuantityPivot) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(pivot_header(pivot.labels()))?;
    for row in &pivot.rows {
        wtr.write_record(pivot_record(row))?;
    }

    let mut totals = vec!["TOTAL".to_string(), String::new()];
    totals.extend(pivot.column_totals.iter().map(|v| qty(*v)));
    wtr.write_record(totals)?;

    wtr.flush()?;
    Ok(())
}

fn pivot_header(labels: Vec<String>) -> Vec<String> {
    let mut header = vec!["pt_code".to_string(), "product_name".to_string()];
    header.extend(labels);
    header
}

fn pivot_record(row: &PivotRow) -> Vec<String> {
    let mut record = vec![
        row.product_key.pt_code.clone(),
        row.product_key.product_name.clone(),
    ];
    record.extend(row.values.iter().map(|v| qty(*v)));
    record
}

fn qty(value: Decimal) -> String {
    value.normalize().to_string()
}

fn rate(value: Decimal) -> String {
    qty(value.round_dp_with_strategy(RATE_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
}
