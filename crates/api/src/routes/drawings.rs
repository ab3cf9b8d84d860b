//! # 图表标注路由控制器
//!
//! 实现 `/api/v1/drawings` 路径下的 REST 接口。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chartdesk_core::drawing::entity::{Drawing, DrawingPatch, NewDrawing};
use chartdesk_core::drawing::port::DrawingStore;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, DrawingsResponse, MessageResponse};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PairFilter {
    /// 按交易对过滤，例如 EURUSD
    pub pair: Option<String>,
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Drawing with id {} not found", id))
}

/// 列出图形
#[utoipa::path(
    get,
    path = "/api/v1/drawings",
    tag = "标注 (Drawings)",
    params(PairFilter),
    responses(
        (status = 200, description = "图形列表", body = DrawingsResponse),
        (status = 500, description = "服务器内部错误", body = ApiErrorResponse)
    )
)]
pub async fn list_drawings(
    State(state): State<AppState>,
    filter: Result<Query<PairFilter>, QueryRejection>,
) -> Result<Json<DrawingsResponse>, ApiError> {
    let Query(filter) = filter?;
    let drawings = state.drawing_store.list(filter.pair.as_deref()).await?;
    Ok(Json(DrawingsResponse {
        count: drawings.len(),
        drawings,
    }))
}

/// 获取单个图形
#[utoipa::path(
    get,
    path = "/api/v1/drawings/{id}",
    tag = "标注 (Drawings)",
    params(
        ("id" = String, Path, description = "图形 ID")
    ),
    responses(
        (status = 200, description = "图形详情", body = Drawing),
        (status = 404, description = "图形不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_drawing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Drawing>, ApiError> {
    state
        .drawing_store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// 新建图形
///
/// 图形 ID 由客户端生成；ID 已存在时返回 409。
#[utoipa::path(
    post,
    path = "/api/v1/drawings",
    tag = "标注 (Drawings)",
    request_body = NewDrawing,
    responses(
        (status = 201, description = "创建成功", body = Drawing),
        (status = 400, description = "参数错误", body = ApiErrorResponse),
        (status = 409, description = "ID 冲突", body = ApiErrorResponse)
    )
)]
pub async fn create_drawing(
    State(state): State<AppState>,
    Json(req): Json<NewDrawing>,
) -> Result<(StatusCode, Json<Drawing>), ApiError> {
    let created = state.drawing_store.create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 更新图形
///
/// 只修改请求体中出现的字段；携带 `series` 时整体替换原有序列。
#[utoipa::path(
    put,
    path = "/api/v1/drawings/{id}",
    tag = "标注 (Drawings)",
    params(
        ("id" = String, Path, description = "图形 ID")
    ),
    request_body = DrawingPatch,
    responses(
        (status = 200, description = "更新成功", body = Drawing),
        (status = 404, description = "图形不存在", body = ApiErrorResponse)
    )
)]
pub async fn update_drawing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<DrawingPatch>,
) -> Result<Json<Drawing>, ApiError> {
    state
        .drawing_store
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// 删除单个图形
#[utoipa::path(
    delete,
    path = "/api/v1/drawings/{id}",
    tag = "标注 (Drawings)",
    params(
        ("id" = String, Path, description = "图形 ID")
    ),
    responses(
        (status = 200, description = "删除成功", body = MessageResponse),
        (status = 404, description = "图形不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_drawing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.drawing_store.delete(&id).await? {
        return Err(not_found(&id));
    }
    Ok(Json(MessageResponse::new(format!(
        "Drawing {} deleted successfully",
        id
    ))))
}

/// 批量删除图形，可按交易对过滤
#[utoipa::path(
    delete,
    path = "/api/v1/drawings",
    tag = "标注 (Drawings)",
    params(PairFilter),
    responses(
        (status = 200, description = "删除成功", body = MessageResponse)
    )
)]
pub async fn delete_all_drawings(
    State(state): State<AppState>,
    filter: Result<Query<PairFilter>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(filter) = filter?;
    let deleted = state.drawing_store.delete_all(filter.pair.as_deref()).await?;

    let mut message = format!("Deleted {} drawing(s)", deleted);
    if let Some(pair) = &filter.pair {
        message.push_str(&format!(" for pair {}", pair));
    }

    Ok(Json(MessageResponse {
        message,
        deleted_count: Some(deleted),
    }))
}
