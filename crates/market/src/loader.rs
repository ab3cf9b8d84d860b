use async_trait::async_trait;
use chartdesk_core::config::DataConfig;
use chartdesk_core::market::entity::Candle;
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::DatasetSource;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// 成交量列的候选名称，按优先级排列。`tick_volume` 为历史导出格式的列名。
const VOLUME_COLUMNS: [&str; 3] = ["volume", "tick_volume", "real_volume"];

/// 大于该值的时间戳视为毫秒。
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// # Summary
/// 基于 CSV 文件的 K 线数据源。
///
/// # Invariants
/// - 每个交易对对应 `DataConfig::csv_path` 解析出的一个文件。
/// - 仅接受由字母、数字、`_`、`-` 组成的交易对代码，杜绝路径穿越。
pub struct CsvDatasetSource {
    config: DataConfig,
}

impl CsvDatasetSource {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DatasetSource for CsvDatasetSource {
    /// # Summary
    /// 读取并规范化交易对对应的 CSV 文件。
    ///
    /// # Logic
    /// 1. 校验交易对代码并解析文件路径。
    /// 2. 在阻塞线程池中完成文件读取与解析，避免占用异步工作线程。
    ///
    /// # Returns
    /// 文件不存在返回 `NotFound`，内容损坏返回 `Internal`。
    async fn load_candles(&self, symbol: &str) -> Result<Vec<Candle>, MarketError> {
        if !is_valid_symbol(symbol) {
            return Err(MarketError::NotFound(format!("Unknown symbol: {}", symbol)));
        }

        let path = self.config.csv_path(symbol);
        debug!("Loading candles for {} from {}", symbol, path.display());

        tokio::task::spawn_blocking(move || read_csv_file(&path))
            .await
            .map_err(|e| MarketError::Internal(format!("Loader task failed: {}", e)))?
    }

    fn symbols(&self) -> Vec<String> {
        self.config
            .symbols
            .iter()
            .map(|s| chartdesk_core::common::normalize_symbol(s))
            .collect()
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// 打开并解析 CSV 文件。
pub fn read_csv_file(path: &Path) -> Result<Vec<Candle>, MarketError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            MarketError::NotFound(format!("CSV file not found: {}", path.display()))
        }
        _ => MarketError::Internal(format!("Failed to open {}: {}", path.display(), e)),
    })?;
    parse_candles(file)
}

/// 规范化后的列索引。
struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    /// # Summary
    /// 根据表头定位六个规范字段。
    ///
    /// # Logic
    /// 1. 表头去除空白并转为小写后匹配。
    /// 2. 成交量列按 `VOLUME_COLUMNS` 的优先级选取第一个存在的列。
    /// 3. 任一必需列缺失即返回 `Internal`。
    fn resolve(headers: &csv::StringRecord) -> Result<Self, MarketError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| MarketError::Internal(format!("Missing column: {}", name)))
        };
        let volume = VOLUME_COLUMNS
            .iter()
            .find_map(|name| names.iter().position(|h| h == name))
            .ok_or_else(|| MarketError::Internal("Missing volume column".to_string()))?;

        Ok(Self {
            time: find("time")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume,
        })
    }
}

/// # Summary
/// 从任意 CSV 输入解析出规范化的 K 线序列。
///
/// # Logic
/// 1. 定位 `time, open, high, low, close` 与成交量列，其余列丢弃。
/// 2. 逐行解析；任何字段缺失或无法解析都会使整个加载失败。
/// 3. 时间统一为整数秒（毫秒时间戳自动换算）。
/// 4. 按时间升序排序，并拒绝重复的时间戳。
///
/// # Returns
/// 升序且无重复的 K 线列表，或 `MarketError::Internal`。
pub fn parse_candles<R: Read>(reader: R) -> Result<Vec<Candle>, MarketError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| MarketError::Internal(format!("Failed to read CSV header: {}", e)))?
        .clone();
    let cols = Columns::resolve(&headers)?;

    let mut candles = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| MarketError::Internal(format!("Malformed CSV row: {}", e)))?;
        // 表头占第 1 行
        let line = idx + 2;
        let field = |col: usize, name: &str| {
            record
                .get(col)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MarketError::Internal(format!("Row {}: missing {}", line, name)))
        };
        let price = |col: usize, name: &str| {
            field(col, name)?.parse::<f64>().map_err(|_| {
                MarketError::Internal(format!("Row {}: invalid {}", line, name))
            })
        };

        let time = parse_integer(field(cols.time, "time")?)
            .map(normalize_seconds)
            .ok_or_else(|| MarketError::Internal(format!("Row {}: invalid time", line)))?;
        let volume = parse_integer(field(cols.volume, "volume")?)
            .ok_or_else(|| MarketError::Internal(format!("Row {}: invalid volume", line)))?;

        candles.push(Candle {
            time,
            open: price(cols.open, "open")?,
            high: price(cols.high, "high")?,
            low: price(cols.low, "low")?,
            close: price(cols.close, "close")?,
            volume,
        });
    }

    candles.sort_by_key(|c| c.time);
    if let Some(dup) = candles.windows(2).find(|w| w[0].time == w[1].time) {
        return Err(MarketError::Internal(format!(
            "Duplicate timestamp: {}",
            dup[0].time
        )));
    }

    Ok(candles)
}

/// 解析整数文本；带小数部分的数值（如 `"1700000000.0"`）截断为整数部分。
fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let (int_part, frac_part) = raw.split_once('.')?;
    if !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match int_part {
        "" | "-" | "+" => Some(0),
        _ => int_part.parse::<i64>().ok(),
    }
}

fn normalize_seconds(ts: i64) -> i64 {
    if ts.unsigned_abs() > MILLIS_THRESHOLD.unsigned_abs() {
        ts / 1000
    } else {
        ts
    }
}
