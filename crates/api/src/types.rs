//! # DTO (Data Transfer Object) 层
//!
//! 面向前端 JSON 输出的响应结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use chartdesk_core::drawing::entity::Drawing;
use chartdesk_core::market::entity::Candle;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  行情相关 DTO
// ============================================================

/// 游标分页的 K 线响应，字段命名沿用 Django REST 风格
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedCandleResponse {
    /// 区间过滤后的 K 线总数
    #[schema(example = 24_960)]
    pub count: usize,
    /// 下一页 URL (仅当本页为满页时提供)
    #[schema(example = "http://localhost:8000/api/v1/pairs/EURUSD/candles?cursor=1704067200&limit=500&direction=next")]
    pub next: Option<String>,
    /// 上一页 URL (仅当请求携带游标时提供)
    pub previous: Option<String>,
    /// 按时间升序排列的 K 线
    pub results: Vec<Candle>,
}

// ============================================================
//  图表标注 DTO
// ============================================================

/// 图形列表响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawingsResponse {
    pub drawings: Vec<Drawing>,
    #[schema(example = 3)]
    pub count: usize,
}

/// 删除操作的结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Deleted 2 drawing(s) for pair EURUSD")]
    pub message: String,
    /// 批量删除时返回删除数量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            deleted_count: None,
        }
    }
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
