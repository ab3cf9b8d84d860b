use async_trait::async_trait;
use chartdesk_core::cache::port::DatasetCache;
use chartdesk_core::common::normalize_symbol;
use chartdesk_core::market::entity::Dataset;
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::{DatasetProvider, DatasetSource};
use std::sync::Arc;

/// # Summary
/// 数据集加载器：组合底层数据源与缓存。
///
/// # Invariants
/// - 同一交易对在进程生命周期内只解析一次（除非显式失效）。
/// - 加载完成后的数据集只读，可被任意数量的请求无锁并发读取。
pub struct DatasetLoader {
    // 原始数据源（CSV 等）
    source: Arc<dyn DatasetSource>,
    // 注入的缓存实现，替代进程级全局变量
    cache: Arc<dyn DatasetCache>,
}

impl DatasetLoader {
    pub fn new(source: Arc<dyn DatasetSource>, cache: Arc<dyn DatasetCache>) -> Arc<Self> {
        Arc::new(Self { source, cache })
    }

    /// 数据源可提供的交易对列表。
    pub fn symbols(&self) -> Vec<String> {
        self.source.symbols()
    }

    /// 已加载到内存中的交易对列表。
    pub fn cached_symbols(&self) -> Vec<String> {
        self.cache.cached_symbols()
    }
}

#[async_trait]
impl DatasetProvider for DatasetLoader {
    /// # Summary
    /// 按交易对获取数据集。
    ///
    /// # Logic
    /// 1. 规范化交易对代码，使大小写不同的请求命中同一缓存项。
    /// 2. 交由缓存处理命中判断与首次加载的并发守卫。
    async fn load(&self, symbol: &str) -> Result<Dataset, MarketError> {
        let symbol = normalize_symbol(symbol);
        self.cache.get_or_load(&symbol, self.source.as_ref()).await
    }

    fn invalidate(&self, symbol: &str) -> bool {
        self.cache.invalidate(&normalize_symbol(symbol))
    }
}
