mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chartdesk_api::server::{AppState, start_server};
use chartdesk_cache::mem::MemDatasetCache;
use chartdesk_core::config::LogConfig;
use chartdesk_market::loader::CsvDatasetSource;
use chartdesk_market::manager::DatasetLoader;
use chartdesk_market::pager::CursorPager;
use chartdesk_store::drawing::SqliteDrawingStore;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 初始化全局日志：终端输出，配置了 `log.dir` 时额外按天滚动写入文件。
///
/// `RUST_LOG` 存在时优先于 `log.level`。返回的 guard 必须存活到进程结束。
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "chartdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 `Arc<dyn Trait>` 注入到 API 层。
///
/// # Logic
/// 1. 加载分层配置并初始化全局日志。
/// 2. 实例化基础设施层（CSV 数据源、内存缓存、SQLite 标注库）。
/// 3. 实例化领域实现层（数据集加载器、游标分页引擎）。
/// 4. 启动 HTTP 服务，收到 Ctrl-C 后优雅退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let extra = std::env::var_os(settings::CONFIG_PATH_ENV).map(PathBuf::from);
    let config = settings::load_config(Path::new("."), extra.as_deref())?;
    let _log_guard = init_tracing(&config.log);
    info!("Chartdesk starting...");
    info!(
        "Serving symbols {:?} from {}",
        config.data.symbols, config.data.data_dir
    );

    // 2. 基础设施层
    let source = Arc::new(CsvDatasetSource::new(config.data.clone()));
    let cache = Arc::new(MemDatasetCache::new());
    let drawing_store = Arc::new(SqliteDrawingStore::new(Path::new(&config.database.data_dir)).await?);

    // 3. 领域实现层
    let loader = DatasetLoader::new(source, cache);
    let pager = CursorPager::new(loader.clone());

    // 4. 启动 API 服务
    let bind_addr = config.server.bind_addr();
    let state = AppState {
        config: Arc::new(config),
        pager,
        datasets: loader,
        drawing_store,
    };

    start_server(state, &bind_addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received. Exiting...");
    })
    .await?;

    Ok(())
}
