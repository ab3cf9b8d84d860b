use async_trait::async_trait;
use chartdesk_cache::mem::MemDatasetCache;
use chartdesk_core::cache::port::DatasetCache;
use chartdesk_core::market::entity::Candle;
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::DatasetSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 记录加载次数的模拟数据源，只认识 EURUSD。
struct CountingSource {
    loads: AtomicUsize,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
        }
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for CountingSource {
    async fn load_candles(&self, symbol: &str) -> Result<Vec<Candle>, MarketError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // 放大并发窗口
        tokio::time::sleep(Duration::from_millis(50)).await;
        if symbol != "EURUSD" {
            return Err(MarketError::NotFound(symbol.to_string()));
        }
        Ok((1..=3)
            .map(|i| Candle {
                time: i * 100,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
            })
            .collect())
    }

    fn symbols(&self) -> Vec<String> {
        vec!["EURUSD".to_string()]
    }
}

#[tokio::test]
async fn test_repeated_loads_return_same_instance() {
    let cache = MemDatasetCache::new();
    let source = CountingSource::new();

    let first = cache.get_or_load("EURUSD", &source).await.unwrap();
    let second = cache.get_or_load("EURUSD", &source).await.unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!(first.len(), 3);
    assert_eq!(source.loads(), 1);
    assert_eq!(cache.cached_symbols(), vec!["EURUSD".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_load_parses_once() {
    let cache = Arc::new(MemDatasetCache::new());
    let source = Arc::new(CountingSource::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = cache.clone();
        let source = source.clone();
        handles.push(tokio::spawn(async move {
            cache.get_or_load("EURUSD", source.as_ref()).await
        }));
    }

    let mut datasets = Vec::new();
    for handle in handles {
        datasets.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(source.loads(), 1);
    assert!(datasets.windows(2).all(|w| w[0].ptr_eq(&w[1])));
}

#[tokio::test]
async fn test_failed_load_is_not_cached() {
    let cache = MemDatasetCache::new();
    let source = CountingSource::new();

    let err = cache.get_or_load("GBPUSD", &source).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
    assert!(cache.cached_symbols().is_empty());

    // 失败不缓存，再次请求会重新访问数据源
    assert!(cache.get_or_load("GBPUSD", &source).await.is_err());
    assert_eq!(source.loads(), 2);
}

#[tokio::test]
async fn test_invalidate_replaces_whole_dataset() {
    let cache = MemDatasetCache::new();
    let source = CountingSource::new();

    let before = cache.get_or_load("EURUSD", &source).await.unwrap();
    assert!(cache.invalidate("EURUSD"));
    assert!(!cache.invalidate("EURUSD"));

    let after = cache.get_or_load("EURUSD", &source).await.unwrap();
    assert!(!before.ptr_eq(&after));
    assert_eq!(source.loads(), 2);

    // 旧快照仍然完整可读
    assert_eq!(before.candles(), after.candles());
}
