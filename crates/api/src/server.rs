//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 组装依赖后调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use chartdesk_core::config::AppConfig;
use chartdesk_core::drawing::port::DrawingStore;
use chartdesk_core::market::port::{CandlePager, DatasetProvider};

use crate::routes::{drawings, pairs, system};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有端口在服务启动前注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 运行配置 (分页上限、交易对列表等)
    pub config: Arc<AppConfig>,
    /// K 线分页引擎
    pub pager: Arc<dyn CandlePager>,
    /// 数据集提供者 (用于失效重载)
    pub datasets: Arc<dyn DatasetProvider>,
    /// 图表标注存储
    pub drawing_store: Arc<dyn DrawingStore>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chartdesk 行情图表 API",
        version = "0.1.0",
        description = "历史 K 线的游标分页读取与图表标注持久化接口。",
        license(name = "MIT")
    ),
    tags(
        (name = "系统 (System)", description = "健康检查"),
        (name = "行情 (Pairs)", description = "交易对列表、K 线游标分页与数据集重载"),
        (name = "标注 (Drawings)", description = "图表标注的增删改查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 按配置构建 CORS 层，未配置来源时放开全部来源。
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// 构建完整的 axum 应用路由树 (含 Swagger UI、CORS 与请求追踪)。
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    // 1. 注册路由并自动收集 OpenAPI 文档
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(system::health))
        .routes(routes!(pairs::list_pairs))
        .routes(routes!(pairs::get_candles))
        .routes(routes!(pairs::reload_pair))
        .routes(routes!(
            drawings::list_drawings,
            drawings::create_drawing,
            drawings::delete_all_drawings
        ))
        .routes(routes!(
            drawings::get_drawing,
            drawings::update_drawing,
            drawings::delete_drawing
        ))
        .with_state(state)
        .split_for_parts();

    // 2. 合并 Swagger UI 路由并应用中间件
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 绑定端口并启动 HTTP 监听，直到 `shutdown` 完成后优雅退出。
///
/// # Arguments
/// * `state` - 由外部组装的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
/// * `shutdown` - 收到关闭信号时完成的 future
pub async fn start_server<F>(
    state: AppState,
    bind_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Chartdesk API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Chartdesk API Server stopped");
    Ok(())
}
