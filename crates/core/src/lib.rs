//! # `chartdesk-core` - 领域核心
//!
//! 定义 K 线分页与图表标注两个领域的实体、错误与端口 (Port)。
//! 本 crate 不做任何 I/O，具体实现由 `chartdesk-cache`、`chartdesk-market`
//! 与 `chartdesk-store` 等适配器 crate 提供。

pub mod cache;
pub mod common;
pub mod config;
pub mod drawing;
pub mod market;
pub mod store;
