//! # `chartdesk-market` - K 线数据集与游标分页
//!
//! - [`loader`]: 从 CSV 读取并规范化 K 线。
//! - [`manager`]: 组合数据源与缓存，对外提供按交易对加载的数据集。
//! - [`pager`]: 基于不可变有序数据集的双向游标分页引擎。

pub mod loader;
pub mod manager;
pub mod pager;
