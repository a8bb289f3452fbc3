//! 集成測試

use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use sdr::io::{write_gap_pivot, write_gap_rows};
use sdr::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn demand(code: &str, qty: i64, on: NaiveDate) -> DemandRecord {
    DemandRecord::new(
        ProductKey::from_code(code),
        Decimal::from(qty),
        on,
        DemandSource::OrderConfirmation,
    )
}

fn supply(code: &str, qty: i64, on: NaiveDate) -> SupplyRecord {
    SupplyRecord::new(
        ProductKey::from_code(code),
        Decimal::from(qty),
        on,
        SupplySource::PendingPo,
    )
}

#[test]
fn test_shortage_then_recovery() {
    // 場景：第 1 週缺 20，第 2 週供應足夠；缺口不結轉
    let demands = vec![demand("P1", 100, date(2025, 1, 2)), demand("P1", 50, date(2025, 1, 8))];
    let supplies = vec![supply("P1", 80, date(2025, 1, 3)), supply("P1", 90, date(2025, 1, 9))];

    let rows = GapProjectionEngine::project(&demands, &supplies, Granularity::Weekly).unwrap();

    assert_eq!(rows.len(), 2);

    let w1 = &rows[0];
    assert_eq!(w1.period.label(), "Week 01 - 2025");
    assert_eq!(w1.begin_inventory, Decimal::ZERO);
    assert_eq!(w1.supply_in_period, Decimal::from(80));
    assert_eq!(w1.total_available, Decimal::from(80));
    assert_eq!(w1.total_demand_qty, Decimal::from(100));
    assert_eq!(w1.gap_quantity, Decimal::from(-20));
    assert_eq!(w1.fulfillment_rate_percent, Decimal::from(80));
    assert_eq!(w1.fulfillment_status, FulfillmentStatus::Shortage);

    let w2 = &rows[1];
    assert_eq!(w2.period.label(), "Week 02 - 2025");
    assert_eq!(w2.begin_inventory, Decimal::ZERO);
    assert_eq!(w2.total_available, Decimal::from(90));
    assert_eq!(w2.gap_quantity, Decimal::from(40));
    assert_eq!(w2.fulfillment_rate_percent, Decimal::from(180));
    assert_eq!(w2.fulfillment_status, FulfillmentStatus::Fulfilled);
}

#[test]
fn test_surplus_carries_forward() {
    let demands = vec![demand("P1", 50, date(2025, 1, 2)), demand("P1", 50, date(2025, 1, 8))];
    let supplies = vec![supply("P1", 100, date(2025, 1, 2))];

    let rows = GapProjectionEngine::project(&demands, &supplies, Granularity::Weekly).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].gap_quantity, Decimal::from(50));
    assert_eq!(rows[1].begin_inventory, Decimal::from(50));
    assert_eq!(rows[1].supply_in_period, Decimal::ZERO);
    assert_eq!(rows[1].total_available, Decimal::from(50));
    assert_eq!(rows[1].gap_quantity, Decimal::ZERO);
    assert_eq!(rows[1].fulfillment_rate_percent, Decimal::from(100));
    assert_eq!(rows[1].fulfillment_status, FulfillmentStatus::Fulfilled);
}

#[test]
fn test_product_without_demand() {
    let supplies = vec![supply("P2", 30, date(2025, 1, 2))];

    let rows = GapProjectionEngine::project(&[], &supplies, Granularity::Weekly).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_demand_qty, Decimal::ZERO);
    assert_eq!(rows[0].total_available, Decimal::from(30));
    assert_eq!(rows[0].gap_quantity, Decimal::from(30));
    assert_eq!(rows[0].fulfillment_rate_percent, Decimal::from(100));
    assert_eq!(rows[0].fulfillment_status, FulfillmentStatus::Fulfilled);
}

#[test]
fn test_products_share_axis_and_are_ordered() {
    // P2 只在第 3 週有需求，P1 只在第 1 週；兩者都要覆蓋共用期間軸
    let demands = vec![demand("P2", 10, date(2025, 1, 15)), demand("P1", 10, date(2025, 1, 2))];

    let rows = GapProjectionEngine::project(&demands, &[], Granularity::Weekly).unwrap();

    let labels: Vec<(String, String)> = rows
        .iter()
        .map(|r| (r.product_key.pt_code.clone(), r.period.label()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("P1".to_string(), "Week 01 - 2025".to_string()),
            ("P1".to_string(), "Week 03 - 2025".to_string()),
            ("P2".to_string(), "Week 01 - 2025".to_string()),
            ("P2".to_string(), "Week 03 - 2025".to_string()),
        ]
    );
}

#[rstest]
#[case(Granularity::Daily, &["2025-01-31", "2025-02-01"])]
#[case(Granularity::Weekly, &["Week 05 - 2025"])]
#[case(Granularity::Monthly, &["Jan 2025", "Feb 2025"])]
fn test_granularity_labels(#[case] granularity: Granularity, #[case] expected: &[&str]) {
    let demands = vec![demand("P1", 5, date(2025, 1, 31)), demand("P1", 5, date(2025, 2, 1))];

    let rows = GapProjectionEngine::project(&demands, &[], granularity).unwrap();
    let labels: Vec<String> = rows.iter().map(|r| r.period.label()).collect();

    assert_eq!(labels, expected);
}

#[test]
fn test_year_boundary_orders_chronologically() {
    // 2024-12-30 屬於 2025 年 ISO 第 1 週
    let demands = vec![
        demand("P1", 1, date(2025, 1, 6)),
        demand("P1", 1, date(2024, 12, 23)),
        demand("P1", 1, date(2024, 12, 30)),
    ];

    let rows = GapProjectionEngine::project(&demands, &[], Granularity::Weekly).unwrap();
    let labels: Vec<String> = rows.iter().map(|r| r.period.label()).collect();

    assert_eq!(labels, vec!["Week 52 - 2024", "Week 01 - 2025", "Week 02 - 2025"]);
}

#[test]
fn test_contiguous_axis_fills_empty_weeks() {
    let config = GapConfig::new(Granularity::Weekly).with_contiguous_axis(true);
    let engine = GapProjectionEngine::new(config);
    let demands = vec![demand("P1", 10, date(2025, 1, 2))];
    let supplies = vec![supply("P1", 30, date(2025, 1, 2)), supply("P1", 0, date(2025, 1, 22))];

    let result = engine.project_records(&demands, &supplies).unwrap();

    assert_eq!(result.periods.len(), 4);
    assert_eq!(result.rows.len(), 4);
    // 盈餘 20 經過空白週一路結轉
    assert!(result.rows[1..]
        .iter()
        .all(|r| r.begin_inventory == Decimal::from(20)));
}

#[test]
fn test_label_ordering_rejects_bad_label() {
    let err = PeriodComparator::sort_labels(Granularity::Weekly, &["Week 02 - 2025", "soon"])
        .unwrap_err();
    assert!(matches!(err, SdrError::InvalidPeriodLabel { .. }));

    let sorted =
        PeriodComparator::sort_labels(Granularity::Monthly, &["Feb 2025", "Dec 2024", "Jan 2025"])
            .unwrap();
    assert_eq!(sorted, vec!["Dec 2024", "Jan 2025", "Feb 2025"]);
}

#[test]
fn test_csv_pipeline_end_to_end() {
    let demand_csv = "\
pt_code,product_pn,package_size,standard_uom,etd,demand_quantity,source_type
PT-1,Vitamin C,25kg,KG,2025-01-02,100,OC
PT-1,Vitamin C,25kg,KG,2025-01-08,50,Forecast
PT-1,Vitamin C,25kg,KG,,999,OC
";
    let supply_csv = "\
pt_code,product_pn,package_size,standard_uom,date_ref,quantity,source_type
PT-1,Vitamin C,25kg,KG,2025-01-09,90,Pending CAN
";
    let inventory_csv = "\
pt_code,product_pn,package_size,standard_uom,remaining_quantity,expiry_date,batch_no
PT-1,Vitamin C,25kg,KG,80,2026-06-30,B-01
PT-1,Vitamin C,25kg,KG,500,2024-12-01,B-00
";

    let loader = CsvLoader::new();
    let demand = loader.load_demand(demand_csv.as_bytes()).unwrap();
    let supply = loader.load_supply(supply_csv.as_bytes()).unwrap();
    let lots = loader.load_inventory(inventory_csv.as_bytes()).unwrap();
    assert_eq!(demand.report.invalid_dates, 1);

    // 庫存參考日落在第 1 週
    let engine = GapProjectionEngine::new(GapConfig::new(Granularity::Weekly));
    let result = engine
        .run(demand.records, supply.records, lots.records, date(2025, 1, 2))
        .unwrap();

    assert_eq!(result.expired_lots, 1);
    assert_eq!(result.dropped_demand, 1);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.shortage_count(), 1);

    let mut buf = Vec::new();
    write_gap_rows(&mut buf, &result.rows).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "PT-1,Vitamin C,25kg,KG,Week 01 - 2025,0,80,80,100,-20,80,Shortage"
    );
    assert_eq!(
        lines[2],
        "PT-1,Vitamin C,25kg,KG,Week 02 - 2025,0,90,90,50,40,180,Fulfilled"
    );

    let mut buf = Vec::new();
    write_gap_pivot(&mut buf, &result.pivot().unwrap()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "pt_code,product_name,Week 01 - 2025,Week 02 - 2025\nPT-1,Vitamin C,-20,40\n"
    );
}

#[test]
fn test_shortage_only_run() {
    let config = GapConfig::new(Granularity::Monthly).with_shortage_only(true);
    let engine = GapProjectionEngine::new(config);
    let demands = vec![demand("P1", 10, date(2025, 1, 5)), demand("P2", 10, date(2025, 1, 5))];
    let supplies = vec![supply("P2", 10, date(2025, 1, 1))];

    let result = engine
        .run(demands, supplies, Vec::new(), date(2025, 1, 1))
        .unwrap();

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].product_key.pt_code, "P1");
    assert!(result.rows.iter().all(GapRow::is_shortage));
}

#[test]
fn test_source_filter_excludes_forecast() {
    let config = GapConfig::new(Granularity::Weekly)
        .with_demand_sources(vec![DemandSource::OrderConfirmation]);
    let engine = GapProjectionEngine::new(config);
    let demands = vec![
        demand("P1", 10, date(2025, 1, 2)),
        DemandRecord::new(
            ProductKey::from_code("P1"),
            Decimal::from(1000),
            date(2025, 1, 2),
            DemandSource::Forecast,
        ),
    ];

    let result = engine
        .run(demands, Vec::new(), Vec::new(), date(2025, 1, 1))
        .unwrap();

    assert_eq!(result.rows[0].total_demand_qty, Decimal::from(10));
}

#[test]
fn test_oversized_csv_quantity_is_rejected_at_ingest() {
    let demand_csv = "pt_code,etd,demand_quantity\nP1,2025-01-02,1e27\n";
    let supply_csv = "pt_code,date_ref,quantity\nP1,2025-01-02,1e27\n";

    let loader = CsvLoader::new();
    let demand = loader.load_demand(demand_csv.as_bytes()).unwrap();
    let supply = loader.load_supply(supply_csv.as_bytes()).unwrap();
    assert_eq!(demand.report.invalid_quantities, 1);
    assert_eq!(supply.report.invalid_quantities, 1);

    let rows =
        GapProjectionEngine::project(&demand.records, &supply.records, Granularity::Weekly)
            .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_available, Decimal::ZERO);
    assert_eq!(rows[0].fulfillment_rate_percent, Decimal::ONE_HUNDRED);
}
