//! CSV 匯入
//!
//! 匯入邊界負責正規化：非數值或缺失數量視為 0，負數量或超過
//! [`MAX_QUANTITY`] 的數量視為 0，無法解析的日期保留為空（由分桶器排除），
//! 缺少料號的列跳過。

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use sdr_core::{
    DemandRecord, DemandSource, InventoryLot, ProductKey, SdrError, SupplyRecord, SupplySource,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::{IoError, Result};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 單筆數量上限（10^15），保證期間彙總與結轉不會超出 `Decimal` 範圍
pub const MAX_QUANTITY: i64 = 1_000_000_000_000_000;

/// 匯入統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// 讀取的資料列數（不含空白列）
    pub rows_read: usize,
    /// 缺少料號而跳過的列數
    pub skipped_rows: usize,
    /// 日期無法解析的列數（記錄保留，日期為空）
    pub invalid_dates: usize,
    /// 數量無法解析、為負或超過上限而視為 0 的列數
    pub invalid_quantities: usize,
    /// 來源標籤無法識別而使用預設來源的列數
    pub unknown_sources: usize,
}

/// 匯入結果
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

/// CSV 匯入器
#[derive(Debug, Clone)]
pub struct CsvLoader {
    default_demand_source: DemandSource,
    default_supply_source: SupplySource,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    /// 創建新的匯入器
    pub fn new() -> Self {
        Self {
            default_demand_source: DemandSource::OrderConfirmation,
            default_supply_source: SupplySource::PendingPo,
        }
    }

    /// 建構器模式：缺少 source_type 欄位時使用的需求來源
    pub fn with_default_demand_source(mut self, source: DemandSource) -> Self {
        self.default_demand_source = source;
        self
    }

    /// 建構器模式：缺少 source_type 欄位時使用的供應來源
    pub fn with_default_supply_source(mut self, source: SupplySource) -> Self {
        self.default_supply_source = source;
        self
    }

    /// 匯入需求
    ///
    /// 欄位：`pt_code`, `product_name|product_pn`, `package_size`, `standard_uom`,
    /// `etd|demand_date`, `demand_quantity`, `source_type`（可選）
    pub fn load_demand<R: Read>(&self, reader: R) -> Result<Loaded<DemandRecord>> {
        let table = Table::read(reader)?;
        let date_col = table.require(&["etd", "demand_date"])?;
        let qty_col = table.require(&["demand_quantity"])?;
        let source_col = table.find(&["source_type"]);

        let mut report = LoadReport::default();
        let mut records = Vec::with_capacity(table.rows.len());

        for (line, row) in table.rows.iter().enumerate() {
            report.rows_read += 1;
            let Some(product_key) = table.product_key(row) else {
                tracing::warn!("需求第 {} 列缺少料號，已跳過", line + 1);
                report.skipped_rows += 1;
                continue;
            };

            let demand_date = read_date(row, &date_col, line, &mut report);
            let quantity = read_quantity(row, &qty_col, line, &mut report);
            let source = match source_col.as_ref().and_then(|c| row.get(c)) {
                Some(label) if !label.is_empty() => DemandSource::from_label(label)
                    .unwrap_or_else(|| {
                        tracing::warn!("需求第 {} 列來源無法識別: {}", line + 1, label);
                        report.unknown_sources += 1;
                        self.default_demand_source
                    }),
                _ => self.default_demand_source,
            };

            records.push(DemandRecord::from_optional_date(
                product_key,
                quantity,
                demand_date,
                source,
            ));
        }

        log_report("需求", &report);
        Ok(Loaded { records, report })
    }

    /// 匯入供應（在途/採購）
    ///
    /// 欄位：`pt_code`, `product_name|product_pn`, `package_size`, `standard_uom`,
    /// `date_ref|supply_date|arrival_date|cargo_ready_date`, `quantity|supply_quantity`,
    /// `source_type`（可選）
    pub fn load_supply<R: Read>(&self, reader: R) -> Result<Loaded<SupplyRecord>> {
        let table = Table::read(reader)?;
        let date_col =
            table.require(&["date_ref", "supply_date", "arrival_date", "cargo_ready_date"])?;
        let qty_col = table.require(&["quantity", "supply_quantity"])?;
        let source_col = table.find(&["source_type"]);

        let mut report = LoadReport::default();
        let mut records = Vec::with_capacity(table.rows.len());

        for (line, row) in table.rows.iter().enumerate() {
            report.rows_read += 1;
            let Some(product_key) = table.product_key(row) else {
                tracing::warn!("供應第 {} 列缺少料號，已跳過", line + 1);
                report.skipped_rows += 1;
                continue;
            };

            let supply_date = read_date(row, &date_col, line, &mut report);
            let quantity = read_quantity(row, &qty_col, line, &mut report);
            let source = match source_col.as_ref().and_then(|c| row.get(c)) {
                Some(label) if !label.is_empty() => SupplySource::from_label(label)
                    .unwrap_or_else(|| {
                        tracing::warn!("供應第 {} 列來源無法識別: {}", line + 1, label);
                        report.unknown_sources += 1;
                        self.default_supply_source
                    }),
                _ => self.default_supply_source,
            };

            records.push(SupplyRecord::from_optional_date(
                product_key,
                quantity,
                supply_date,
                source,
            ));
        }

        log_report("供應", &report);
        Ok(Loaded { records, report })
    }

    /// 匯入現有庫存批次
    ///
    /// 欄位：`pt_code`, `product_name|product_pn`, `package_size`, `standard_uom`,
    /// `remaining_quantity|quantity`, `expiry_date`（可選）, `batch_no`（可選）
    pub fn load_inventory<R: Read>(&self, reader: R) -> Result<Loaded<InventoryLot>> {
        let table = Table::read(reader)?;
        let qty_col = table.require(&["remaining_quantity", "quantity"])?;
        let expiry_col = table.find(&["expiry_date"]);
        let batch_col = table.find(&["batch_no", "batch"]);

        let mut report = LoadReport::default();
        let mut records = Vec::with_capacity(table.rows.len());

        for (line, row) in table.rows.iter().enumerate() {
            report.rows_read += 1;
            let Some(product_key) = table.product_key(row) else {
                tracing::warn!("庫存第 {} 列缺少料號，已跳過", line + 1);
                report.skipped_rows += 1;
                continue;
            };

            let quantity = read_quantity(row, &qty_col, line, &mut report);
            let mut lot = InventoryLot::new(product_key, quantity);

            // 有效期限空白或無法解析時視為無期限
            if let Some(col) = &expiry_col {
                let has_expiry = row.get(col).is_some_and(|v| !v.is_empty());
                if has_expiry {
                    if let Some(expiry) = read_date(row, col, line, &mut report) {
                        lot = lot.with_expiry_date(expiry);
                    }
                }
            }
            if let Some(batch) = batch_col.as_ref().and_then(|c| row.get(c)) {
                if !batch.is_empty() {
                    lot = lot.with_batch_no(batch.clone());
                }
            }
            records.push(lot);
        }

        log_report("庫存", &report);
        Ok(Loaded { records, report })
    }

    /// 從檔案匯入需求
    pub fn load_demand_path(&self, path: &Path) -> Result<Loaded<DemandRecord>> {
        self.load_demand(File::open(path)?)
    }

    /// 從檔案匯入供應
    pub fn load_supply_path(&self, path: &Path) -> Result<Loaded<SupplyRecord>> {
        self.load_supply(File::open(path)?)
    }

    /// 從檔案匯入庫存批次
    pub fn load_inventory_path(&self, path: &Path) -> Result<Loaded<InventoryLot>> {
        self.load_inventory(File::open(path)?)
    }
}

/// 解析日期文字
///
/// 支援 `YYYY-MM-DD`、`DD/MM/YYYY`、`YYYY-MM-DD HH:MM:SS`、`YYYY-MM-DDTHH:MM:SS`。
pub fn parse_date(text: &str) -> sdr_core::Result<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| SdrError::InvalidDate(text.to_string()))
}

/// 解析數量文字（允許千分位逗號）
///
/// 空白回傳 `Some(0)`；無法解析回傳 `None`。
pub fn parse_quantity(text: &str) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn read_date(
    row: &HashMap<String, String>,
    column: &str,
    line: usize,
    report: &mut LoadReport,
) -> Option<NaiveDate> {
    let text = row.get(column).map(String::as_str).unwrap_or("");
    if text.is_empty() {
        report.invalid_dates += 1;
        return None;
    }
    match parse_date(text) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!("第 {} 列: {}", line + 1, e);
            report.invalid_dates += 1;
            None
        }
    }
}

fn read_quantity(
    row: &HashMap<String, String>,
    column: &str,
    line: usize,
    report: &mut LoadReport,
) -> Decimal {
    let text = row.get(column).map(String::as_str).unwrap_or("");
    match parse_quantity(text) {
        Some(qty) if qty > Decimal::from(MAX_QUANTITY) => {
            tracing::warn!("第 {} 列數量超過上限 ({})，視為 0", line + 1, qty);
            report.invalid_quantities += 1;
            Decimal::ZERO
        }
        Some(qty) if qty >= Decimal::ZERO => qty,
        Some(qty) => {
            tracing::warn!("第 {} 列數量為負 ({})，視為 0", line + 1, qty);
            report.invalid_quantities += 1;
            Decimal::ZERO
        }
        None => {
            tracing::warn!("第 {} 列數量無法解析 ({})，視為 0", line + 1, text);
            report.invalid_quantities += 1;
            Decimal::ZERO
        }
    }
}

fn log_report(kind: &str, report: &LoadReport) {
    tracing::info!(
        "{}匯入完成：{} 列，跳過 {} 列，日期無效 {} 列，數量無效 {} 列",
        kind,
        report.rows_read,
        report.skipped_rows,
        report.invalid_dates,
        report.invalid_quantities
    );
}

/// 產品鍵四個欄位的實際表頭
struct KeyColumns {
    pt_code: Option<String>,
    product_name: Option<String>,
    package_size: Option<String>,
    standard_uom: Option<String>,
}

/// 已讀入記憶體的 CSV 表
struct Table {
    headers: Vec<String>,
    key_columns: KeyColumns,
    rows: Vec<HashMap<String, String>>,
}

impl Table {
    fn read<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.trim().to_string()))
                .collect();

            // 跳過完全空白的列
            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        let key_columns = KeyColumns {
            pt_code: find_column(&headers, &["pt_code"]),
            product_name: find_column(&headers, &["product_name", "product_pn"]),
            package_size: find_column(&headers, &["package_size"]),
            standard_uom: find_column(&headers, &["standard_uom"]),
        };

        Ok(Self {
            headers,
            key_columns,
            rows,
        })
    }

    /// 依別名尋找欄位
    fn find(&self, aliases: &[&str]) -> Option<String> {
        find_column(&self.headers, aliases)
    }

    /// 必要欄位
    fn require(&self, aliases: &[&str]) -> Result<String> {
        self.find(aliases)
            .ok_or_else(|| IoError::MissingColumn(aliases.join("|")))
    }

    fn product_key(&self, row: &HashMap<String, String>) -> Option<ProductKey> {
        let cols = &self.key_columns;
        let pt_code = cell(row, cols.pt_code.as_ref());
        if pt_code.is_empty() {
            return None;
        }
        Some(ProductKey::new(
            pt_code,
            cell(row, cols.product_name.as_ref()),
            cell(row, cols.package_size.as_ref()),
            cell(row, cols.standard_uom.as_ref()),
        ))
    }
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find(|alias| headers.iter().any(|h| h == *alias))
        .map(|alias| alias.to_string())
}

fn cell(row: &HashMap<String, String>, column: Option<&String>) -> String {
    column.and_then(|c| row.get(c).cloned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-01-06", 2025, 1, 6)]
    #[case("06/01/2025", 2025, 1, 6)]
    #[case("2025-01-06 13:45:00", 2025, 1, 6)]
    #[case("2025-01-06T00:00:00", 2025, 1, 6)]
    fn test_parse_date_formats(#[case] text: &str, #[case] y: i32, #[case] m: u32, #[case] d: u32) {
        assert_eq!(parse_date(text).unwrap(), NaiveDate::from_ymd_opt(y, m, d).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(matches!(parse_date("next week"), Err(SdrError::InvalidDate(_))));
    }

    #[rstest]
    #[case("1,250", Some(Decimal::from(1250)))]
    #[case("", Some(Decimal::ZERO))]
    #[case("12.5", Some(Decimal::new(125, 1)))]
    #[case("n/a", None)]
    fn test_parse_quantity(#[case] text: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_quantity(text), expected);
    }

    #[test]
    fn test_load_demand_normalizes_rows() {
        let csv = "\
pt_code,product_pn,package_size,standard_uom,etd,demand_quantity,source_type
PT-1,Vitamin C,25kg,KG,2025-01-06,100,OC
PT-1,Vitamin C,25kg,KG,not a date,40,Forecast
PT-2,Citric Acid,25kg,KG,2025-01-07,abc,OC
,Orphan,1kg,KG,2025-01-07,5,OC
PT-3,Glucose,25kg,KG,2025-01-08,-3,Backlog
,,,,,,
";
        let loaded = CsvLoader::new().load_demand(csv.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 4);
        assert_eq!(loaded.report.rows_read, 5);
        assert_eq!(loaded.report.skipped_rows, 1);
        assert_eq!(loaded.report.invalid_dates, 1);
        assert_eq!(loaded.report.invalid_quantities, 2);
        assert_eq!(loaded.report.unknown_sources, 1);

        let first = &loaded.records[0];
        assert_eq!(first.product_key.product_name, "Vitamin C");
        assert_eq!(first.demand_quantity, Decimal::from(100));

        assert!(loaded.records[1].demand_date.is_none());
        assert!(loaded.records[1].is_forecast());
        assert_eq!(loaded.records[2].demand_quantity, Decimal::ZERO);
        assert_eq!(loaded.records[3].source, DemandSource::OrderConfirmation);
    }

    #[test]
    fn test_quantity_above_limit_is_rejected() {
        let csv = "\
pt_code,etd,demand_quantity
P1,2025-01-02,1e27
P1,2025-01-02,1000000000000000
";
        let loaded = CsvLoader::new().load_demand(csv.as_bytes()).unwrap();

        assert_eq!(loaded.report.invalid_quantities, 1);
        assert_eq!(loaded.records[0].demand_quantity, Decimal::ZERO);
        assert_eq!(loaded.records[1].demand_quantity, Decimal::from(MAX_QUANTITY));
    }

    #[test]
    fn test_product_key_aliases_resolved_from_header() {
        let csv = "\
PT_CODE,Product_PN,standard_uom,date_ref,quantity
PT-9,Glucose,KG,2025-02-01,4
";
        let loaded = CsvLoader::new().load_supply(csv.as_bytes()).unwrap();
        let key = &loaded.records[0].product_key;

        assert_eq!(key.pt_code, "PT-9");
        assert_eq!(key.product_name, "Glucose");
        assert_eq!(key.package_size, "");
        assert_eq!(key.standard_uom, "KG");
    }

    #[test]
    fn test_load_supply_requires_date_column() {
        let csv = "pt_code,quantity\nPT-1,10\n";
        let err = CsvLoader::new().load_supply(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, IoError::MissingColumn(_)));
    }

    #[test]
    fn test_load_supply_sources() {
        let csv = "\
pt_code,product_name,date_ref,quantity,source_type
PT-1,Vitamin C,2025-02-01,30,Pending CAN
PT-1,Vitamin C,2025-02-10,20,
";
        let loaded = CsvLoader::new()
            .with_default_supply_source(SupplySource::PendingPo)
            .load_supply(csv.as_bytes())
            .unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].source, SupplySource::PendingCan);
        assert_eq!(loaded.records[1].source, SupplySource::PendingPo);
    }

    #[test]
    fn test_load_inventory_with_expiry() {
        let csv = "\
pt_code,product_name,remaining_quantity,expiry_date,batch_no
PT-1,Vitamin C,12,2025-03-31,B-01
PT-2,Glucose,8,,
";
        let loaded = CsvLoader::new().load_inventory(csv.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(
            loaded.records[0].expiry_date,
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
        assert_eq!(loaded.records[0].batch_no.as_deref(), Some("B-01"));
        assert!(loaded.records[1].expiry_date.is_none());
    }
}
