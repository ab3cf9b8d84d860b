use crate::market::entity::Dataset;
use crate::market::error::MarketError;
use crate::market::port::DatasetSource;
use async_trait::async_trait;

/// # Summary
/// 按交易对缓存不可变数据集的接口 (Port)。
///
/// # Invariants
/// - 同一交易对在并发首次请求下只调用一次数据源（按键初始化守卫）。
/// - 加载失败不写入缓存，下一次请求会重新尝试。
/// - 失效操作整体移除条目，绝不原地修改已发布的数据集。
#[async_trait]
pub trait DatasetCache: Send + Sync {
    /// # Summary
    /// 获取缓存中的数据集，缺失时通过数据源加载。
    ///
    /// # Logic
    /// 1. 取得（或创建）该交易对的初始化单元。
    /// 2. 若单元已初始化则直接克隆句柄返回。
    /// 3. 否则在守卫内调用 `source.load_candles` 并构造数据集。
    ///
    /// # Arguments
    /// * `symbol`: 已规范化的交易对代码。
    /// * `source`: 缓存未命中时使用的数据源。
    ///
    /// # Returns
    /// 数据集句柄或加载错误。
    async fn get_or_load(
        &self,
        symbol: &str,
        source: &dyn DatasetSource,
    ) -> Result<Dataset, MarketError>;

    /// 移除指定交易对的缓存，返回此前是否存在。
    fn invalidate(&self, symbol: &str) -> bool;

    /// 当前已完成加载的交易对列表。
    fn cached_symbols(&self) -> Vec<String>;
}
