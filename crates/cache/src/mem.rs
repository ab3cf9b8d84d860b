use async_trait::async_trait;
use chartdesk_core::cache::port::DatasetCache;
use chartdesk_core::market::entity::Dataset;
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::DatasetSource;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// # Summary
/// 基于 DashMap 的内存数据集缓存。
///
/// # Invariants
/// - 每个交易对对应一个 `OnceCell`，作为按键初始化守卫：并发首次请求只会触发一次解析。
/// - 已发布的数据集不可变；失效时整体移除条目，下一次请求构造全新的数据集。
/// - 不提供自动过期或容量限制，生命周期与进程一致。
pub struct MemDatasetCache {
    // 交易对 -> 初始化单元
    storage: DashMap<String, Arc<OnceCell<Dataset>>>,
}

impl MemDatasetCache {
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// 取出（或插入）交易对的初始化单元。DashMap 的分片锁在返回前即释放，不会跨越 await。
    fn cell(&self, symbol: &str) -> Arc<OnceCell<Dataset>> {
        self.storage
            .entry(symbol.to_string())
            .or_default()
            .value()
            .clone()
    }
}

impl Default for MemDatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetCache for MemDatasetCache {
    /// # Summary
    /// 获取数据集，未命中时在初始化守卫内加载。
    ///
    /// # Logic
    /// 1. 克隆交易对对应的 `OnceCell` 句柄。
    /// 2. 已初始化则直接返回。
    /// 3. 否则调用 `get_or_try_init`，同一时刻只有一个调用者执行加载，其余调用者等待结果。
    /// 4. 加载失败时移除空单元，避免未知交易对无限占用表项。
    async fn get_or_load(
        &self,
        symbol: &str,
        source: &dyn DatasetSource,
    ) -> Result<Dataset, MarketError> {
        let cell = self.cell(symbol);

        if let Some(dataset) = cell.get() {
            debug!("Dataset cache hit: {}", symbol);
            return Ok(dataset.clone());
        }

        let result = cell
            .get_or_try_init(|| async {
                let started = std::time::Instant::now();
                let candles = source.load_candles(symbol).await?;
                info!(
                    "Dataset loaded: symbol={}, rows={}, elapsed={:?}",
                    symbol,
                    candles.len(),
                    started.elapsed()
                );
                Ok::<_, MarketError>(Dataset::new(symbol, candles))
            })
            .await
            .cloned();

        if result.is_err() {
            self.storage
                .remove_if(symbol, |_, c| Arc::ptr_eq(c, &cell) && !c.initialized());
        }

        result
    }

    fn invalidate(&self, symbol: &str) -> bool {
        let removed = self.storage.remove(symbol).is_some();
        if removed {
            info!("Dataset cache invalidated: {}", symbol);
        }
        removed
    }

    fn cached_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .storage
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        symbols.sort();
        symbols
    }
}
