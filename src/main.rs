//! sdr-gap：從 CSV 產生供需 GAP 報表

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use sdr::io::{parse_date, write_gap_pivot, write_gap_rows};
use sdr::{CsvLoader, GapConfig, GapProjectionEngine, Granularity};

#[derive(Debug, Parser)]
#[command(name = "sdr-gap", version, about = "Supply-demand GAP analysis with carry-forward")]
struct Cli {
    /// 需求 CSV（可重複）
    #[arg(long = "demand", value_name = "PATH")]
    demand: Vec<PathBuf>,

    /// 在途/採購供應 CSV（可重複）
    #[arg(long = "supply", value_name = "PATH")]
    supply: Vec<PathBuf>,

    /// 現有庫存批次 CSV（可重複）
    #[arg(long = "inventory", value_name = "PATH")]
    inventory: Vec<PathBuf>,

    /// JSON 配置檔
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 期間粒度（daily / weekly / monthly），覆蓋配置檔
    #[arg(long, value_parser = parse_granularity)]
    granularity: Option<Granularity>,

    /// 只輸出缺貨行
    #[arg(long)]
    shortage_only: bool,

    /// 庫存參考日（預設今天）
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// GAP 明細輸出路徑（預設標準輸出）
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// GAP 樞紐表輸出路徑
    #[arg(long, value_name = "PATH")]
    pivot_output: Option<PathBuf>,

    /// 計算摘要（JSON）輸出路徑
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// 日誌等級
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 JSON 格式輸出日誌
    #[arg(long)]
    json_log: bool,
}

fn parse_granularity(s: &str) -> std::result::Result<Granularity, String> {
    s.parse().map_err(|e: sdr::SdrError| e.to_string())
}

fn parse_today(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

/// 初始化日誌（RUST_LOG 優先）
fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("sdr={level},sdr_calc={level},sdr_io={level}");
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr);
    let initialized = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = initialized {
        eprintln!("日誌初始化失敗: {e}");
    }
}

fn load_config(cli: &Cli) -> Result<GapConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("無法讀取配置檔 {}", path.display()))?;
            GapConfig::from_json_str(&text)
                .with_context(|| format!("配置檔格式錯誤 {}", path.display()))?
        }
        None => GapConfig::default(),
    };

    if let Some(granularity) = cli.granularity {
        config.granularity = granularity;
    }
    if cli.shortage_only {
        config.shortage_only = true;
    }
    config.validate()?;
    Ok(config)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("無法建立輸出檔 {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_log);

    let config = load_config(&cli)?;
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let loader = CsvLoader::new();
    let mut demand = Vec::new();
    for path in &cli.demand {
        let loaded = loader
            .load_demand_path(path)
            .with_context(|| format!("需求檔匯入失敗 {}", path.display()))?;
        demand.extend(loaded.records);
    }

    let mut supply = Vec::new();
    for path in &cli.supply {
        let loaded = loader
            .load_supply_path(path)
            .with_context(|| format!("供應檔匯入失敗 {}", path.display()))?;
        supply.extend(loaded.records);
    }

    let mut lots = Vec::new();
    for path in &cli.inventory {
        let loaded = loader
            .load_inventory_path(path)
            .with_context(|| format!("庫存檔匯入失敗 {}", path.display()))?;
        lots.extend(loaded.records);
    }

    let engine = GapProjectionEngine::new(config);
    let result = engine.run(demand, supply, lots, today)?;

    for warning in &result.warnings {
        tracing::warn!("{}", warning.message);
    }
    if result.rows.is_empty() {
        tracing::info!("沒有資料");
    }

    let output = open_output(cli.output.as_deref())?;
    write_gap_rows(output, &result.rows)?;

    if let Some(path) = &cli.pivot_output {
        let mut pivot = result.pivot()?;
        if engine.config().shortage_only {
            pivot = pivot.shortages_only();
        }
        write_gap_pivot(open_output(Some(path))?, &pivot)?;
    }

    if let Some(path) = &cli.summary {
        let summary = open_output(Some(path))?;
        serde_json::to_writer_pretty(summary, &result)
            .with_context(|| format!("無法寫入摘要 {}", path.display()))?;
    }

    tracing::info!(
        "完成：{} 行明細，{} 行缺貨，期間 {} 個",
        result.rows.len(),
        result.shortage_count(),
        result.periods.len()
    );
    Ok(())
}
