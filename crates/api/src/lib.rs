//! # `chartdesk-api` - HTTP API 网关
//!
//! 本 crate 是 Chartdesk 的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收图表前端的 HTTP 请求，完成参数校验、limit 裁剪与 ISO-8601 时间转换
//! - 调用下层 `CandlePager` 与 `DrawingStore` 完成业务操作
//! - 按翻页链接策略生成 `next`/`previous` URL
//! - 将领域错误映射为 HTTP 状态码，内部错误不向客户端透传细节

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
