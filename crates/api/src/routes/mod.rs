//! # 路由控制器
//!
//! - [`pairs`]: 交易对列表与 K 线游标分页
//! - [`drawings`]: 图表标注的增删改查
//! - [`system`]: 健康检查

pub mod drawings;
pub mod pairs;
pub mod system;
