use async_trait::async_trait;
use chartdesk_core::market::entity::{Candle, Direction, PageRequest, PageResult};
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::{CandlePager, DatasetProvider};
use std::sync::Arc;
use tracing::debug;

/// # Summary
/// 基于游标的 K 线分页引擎。
///
/// # Invariants
/// - 无状态：游标完全由上一页的数据推导，请求幂等、可安全重试。
/// - 只读取数据集，不写入任何共享可变状态。
pub struct CursorPager {
    loader: Arc<dyn DatasetProvider>,
}

impl CursorPager {
    pub fn new(loader: Arc<dyn DatasetProvider>) -> Arc<Self> {
        Arc::new(Self { loader })
    }
}

#[async_trait]
impl CandlePager for CursorPager {
    /// # Summary
    /// 获取一页 K 线。
    ///
    /// # Logic
    /// 1. 通过加载器取得数据集（仅首次请求涉及 I/O）。
    /// 2. 在内存中的有序切片上执行纯同步的分页计算。
    async fn get_page(&self, request: &PageRequest) -> Result<PageResult, MarketError> {
        let dataset = self.loader.load(&request.symbol).await?;
        let page = paginate(dataset.candles(), request)?;
        debug!(
            "Page computed: symbol={}, cursor={:?}, direction={}, limit={}, returned={}, total={}",
            dataset.symbol(),
            request.cursor,
            request.direction,
            request.limit,
            page.records.len(),
            page.total_count
        );
        Ok(page)
    }
}

/// # Summary
/// 在升序 K 线切片上计算一页结果。
///
/// # Logic
/// 1. 先按 `[start, end]` 闭区间收窄得到过滤视图，视图大小即 `total_count`。
/// 2. 再按游标与方向切片：
///    - 无游标：取视图末尾 `limit` 条（最新数据）。
///    - `Next`：取 `time > cursor` 的前 `limit` 条。
///    - `Prev`：取 `time < cursor` 的后 `limit` 条。
/// 3. 游标只由返回页计算：`next_cursor` 为最后一条的时间，`prev_cursor` 为第一条的时间。
///
/// 游标无需与任何记录精确匹配，比较全部为整数不等式。边界均通过二分查找定位。
///
/// # Arguments
/// * `candles`: 按时间升序且无重复的 K 线。
/// * `request`: 分页请求。
///
/// # Returns
/// `limit == 0` 时返回 `InvalidArgument`；视图为空时返回空页而不是错误。
pub fn paginate(candles: &[Candle], request: &PageRequest) -> Result<PageResult, MarketError> {
    if request.limit == 0 {
        return Err(MarketError::InvalidArgument(
            "limit must be a positive integer".to_string(),
        ));
    }
    let limit = request.limit;

    let lower = request
        .start
        .map_or(0, |start| candles.partition_point(|c| c.time < start));
    let upper = request
        .end
        .map_or(candles.len(), |end| candles.partition_point(|c| c.time <= end));
    // start > end 时视图为空
    let view = candles.get(lower..upper).unwrap_or_default();

    let page = match request.cursor {
        None => tail(view, limit),
        Some(cursor) => match request.direction {
            Direction::Next => {
                let after = &view[view.partition_point(|c| c.time <= cursor)..];
                head(after, limit)
            }
            Direction::Prev => {
                let before = &view[..view.partition_point(|c| c.time < cursor)];
                tail(before, limit)
            }
        },
    };

    Ok(PageResult {
        records: page.to_vec(),
        total_count: view.len(),
        next_cursor: page.last().map(|c| c.time),
        prev_cursor: page.first().map(|c| c.time),
    })
}

fn head(slice: &[Candle], n: usize) -> &[Candle] {
    &slice[..slice.len().min(n)]
}

fn tail(slice: &[Candle], n: usize) -> &[Candle] {
    &slice[slice.len().saturating_sub(n)..]
}
