use crate::market::error::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

/// # Summary
/// 单根 K 线数据实体，记录固定时间桶内的 OHLCV 聚合行情。
///
/// # Invariants
/// - `time` 为 Unix 秒，在同一交易对的数据集内唯一且严格递增。
/// - 加载完成后不可变，价格与成交量原样透传，不做任何取整或单位换算。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Candle {
    /// K 线开始时间 (Unix 秒)
    #[schema(example = 1_704_067_200_i64)]
    pub time: i64,
    /// 开盘价
    #[schema(example = 1.10432)]
    pub open: f64,
    /// 最高价
    #[schema(example = 1.10501)]
    pub high: f64,
    /// 最低价
    #[schema(example = 1.10398)]
    pub low: f64,
    /// 收盘价
    #[schema(example = 1.10477)]
    pub close: f64,
    /// 成交量 (Tick Volume)
    #[schema(example = 1532)]
    pub volume: i64,
}

/// # Summary
/// 单个交易对的完整 K 线数据集。
///
/// # Invariants
/// - `candles` 按 `time` 升序排列且无重复时间戳，由加载器在构造前保证。
/// - 构造后永不原地修改；失效时由缓存整体替换，持有旧快照的读者不受影响。
/// - 克隆只增加引用计数，所有请求共享同一份底层切片。
#[derive(Debug, Clone)]
pub struct Dataset {
    symbol: String,
    candles: Arc<[Candle]>,
}

impl Dataset {
    /// 使用已排序、已去重的 K 线构造数据集。
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            candles: candles.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 判断两个句柄是否指向同一份内存中的数据集。
    pub fn ptr_eq(&self, other: &Dataset) -> bool {
        Arc::ptr_eq(&self.candles, &other.candles)
    }
}

/// # Summary
/// 分页方向。
///
/// # Invariants
/// - 仅接受 `next` 与 `prev` 两个取值，其余字符串解析失败，不做静默回退。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// 沿时间向后翻页 (更新的数据)
    #[default]
    Next,
    /// 沿时间向前翻页 (更早的数据)
    Prev,
}

impl FromStr for Direction {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            other => Err(MarketError::InvalidArgument(format!(
                "direction must be 'next' or 'prev', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Prev => write!(f, "prev"),
        }
    }
}

/// # Summary
/// 分页请求。
///
/// # Invariants
/// - `limit` 由边界层预先裁剪到 `[1, max]`；引擎仍会拒绝 0。
/// - `start`/`end` 为闭区间边界 (Unix 秒)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub symbol: String,
    pub cursor: Option<i64>,
    pub direction: Direction,
    pub limit: usize,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl PageRequest {
    /// 构造一个不带游标与区间过滤的请求，即"最新一页"。
    pub fn latest(symbol: impl Into<String>, limit: usize) -> Self {
        Self {
            symbol: symbol.into(),
            cursor: None,
            direction: Direction::Next,
            limit,
            start: None,
            end: None,
        }
    }

    pub fn with_cursor(mut self, cursor: i64, direction: Direction) -> Self {
        self.cursor = Some(cursor);
        self.direction = direction;
        self
    }

    pub fn with_range(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// # Summary
/// 分页结果。
///
/// # Invariants
/// - `records.len() <= limit`，且按时间升序。
/// - `total_count` 为区间过滤后、游标切片前的视图大小。
/// - `next_cursor`/`prev_cursor` 分别为本页最后/第一条记录的时间；空页时均为 None。
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub records: Vec<Candle>,
    pub total_count: usize,
    pub next_cursor: Option<i64>,
    pub prev_cursor: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("next".parse::<Direction>().unwrap(), Direction::Next);
        assert_eq!("prev".parse::<Direction>().unwrap(), Direction::Prev);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(MarketError::InvalidArgument(_))
        ));
        // 大小写敏感
        assert!("NEXT".parse::<Direction>().is_err());
    }

    #[test]
    fn test_dataset_shares_storage() {
        let ds = Dataset::new("EURUSD", vec![]);
        let cloned = ds.clone();
        assert!(ds.ptr_eq(&cloned));
        assert!(cloned.is_empty());
        assert_eq!(cloned.symbol(), "EURUSD");
    }
}
