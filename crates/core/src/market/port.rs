use crate::market::entity::{Candle, Dataset, PageRequest, PageResult};
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// K 线数据集的底层数据源接口（例如 CSV 文件）。
///
/// # Invariants
/// - 返回的 K 线必须已完成规范化：按时间升序、无重复、字段齐全。
/// - 数据缺失时返回 `MarketError::NotFound`，数据损坏时返回 `MarketError::Internal`。
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// # Summary
    /// 读取并规范化指定交易对的全部 K 线。
    ///
    /// # Arguments
    /// * `symbol`: 已规范化（大写）的交易对代码。
    ///
    /// # Returns
    /// 成功返回升序 K 线列表。
    async fn load_candles(&self, symbol: &str) -> Result<Vec<Candle>, MarketError>;

    /// 列出该数据源可提供的交易对。
    fn symbols(&self) -> Vec<String>;
}

/// # Summary
/// 数据集加载器契约：按交易对返回内存中的数据集，并保证同一交易对只解析一次。
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// # Summary
    /// 获取指定交易对的数据集。
    ///
    /// # Logic
    /// 1. 命中缓存则直接返回同一份内存实例。
    /// 2. 未命中则从数据源加载并写入缓存。
    ///
    /// # Returns
    /// 成功返回数据集句柄，未知交易对返回 `MarketError::NotFound`。
    async fn load(&self, symbol: &str) -> Result<Dataset, MarketError>;

    /// 使指定交易对的缓存失效，下次请求时整体重建。
    fn invalidate(&self, symbol: &str) -> bool;
}

/// # Summary
/// 游标分页引擎契约。
///
/// # Invariants
/// - 无状态：不在服务端保存任何游标或会话，相同请求返回相同结果。
/// - 不修改底层数据集。
#[async_trait]
pub trait CandlePager: Send + Sync {
    /// # Summary
    /// 按游标、方向与可选时间区间返回一页 K 线。
    ///
    /// # Arguments
    /// * `request`: 分页请求。
    ///
    /// # Returns
    /// 成功返回分页结果；未知交易对返回 `NotFound`，非法 limit 返回 `InvalidArgument`。
    async fn get_page(&self, request: &PageRequest) -> Result<PageResult, MarketError>;
}
