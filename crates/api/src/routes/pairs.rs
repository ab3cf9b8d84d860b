//! # 交易对与 K 线路由控制器
//!
//! 实现 `/api/v1/pairs` 路径下的 REST 接口，负责把 HTTP 查询参数转换为分页请求，
//! 并根据翻页链接策略生成 `next`/`previous` URL。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderMap, Uri, header};
use chartdesk_core::common::normalize_symbol;
use chartdesk_core::common::time::parse_iso8601;
use chartdesk_core::market::entity::{Direction, PageRequest, PageResult};
use chartdesk_core::market::error::MarketError;
use chartdesk_core::market::port::{CandlePager, DatasetProvider};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, MessageResponse, PaginatedCandleResponse};

/// 获取可用交易对列表
#[utoipa::path(
    get,
    path = "/api/v1/pairs",
    tag = "行情 (Pairs)",
    responses(
        (status = 200, description = "交易对列表", body = Vec<String>)
    )
)]
pub async fn list_pairs(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .config
            .data
            .symbols
            .iter()
            .map(|s| normalize_symbol(s))
            .collect(),
    )
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CandlesQuery {
    /// 分页游标 (Unix 秒)，为空时返回最新一页
    pub cursor: Option<i64>,
    /// 翻页方向: `next` 或 `prev`，默认 `next`
    pub direction: Option<String>,
    /// 每页数量，会被裁剪到 `[1, max_limit]`
    pub limit: Option<i64>,
    /// ISO-8601 起始时间 (包含)
    pub start_date: Option<String>,
    /// ISO-8601 结束时间 (包含)
    pub end_date: Option<String>,
}

/// 获取 K 线 (游标分页)
///
/// 支持双向游标翻页与可选的绝对时间区间过滤。
/// 仅当本页为满页时提供 `next`，仅当请求携带游标时提供 `previous`。
#[utoipa::path(
    get,
    path = "/api/v1/pairs/{symbol}/candles",
    tag = "行情 (Pairs)",
    params(
        ("symbol" = String, Path, description = "交易对代码，例如 EURUSD"),
        CandlesQuery
    ),
    responses(
        (status = 200, description = "分页结果", body = PaginatedCandleResponse),
        (status = 400, description = "参数错误", body = ApiErrorResponse),
        (status = 404, description = "交易对不存在", body = ApiErrorResponse),
        (status = 500, description = "服务器内部错误", body = ApiErrorResponse)
    )
)]
pub async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    query: Result<Query<CandlesQuery>, QueryRejection>,
) -> Result<Json<PaginatedCandleResponse>, ApiError> {
    let Query(query) = query?;
    let symbol = normalize_symbol(&symbol);
    let direction: Direction = query.direction.as_deref().unwrap_or("next").parse()?;
    let limit = state.config.pagination.clamp_limit(query.limit);

    let request = PageRequest {
        symbol: symbol.clone(),
        cursor: query.cursor,
        direction,
        limit,
        start: parse_date("start_date", query.start_date.as_deref())?,
        end: parse_date("end_date", query.end_date.as_deref())?,
    };

    let page = state.pager.get_page(&request).await.map_err(|e| match e {
        MarketError::NotFound(detail) => {
            // 不向客户端暴露文件路径
            tracing::debug!("Candles not found for {}: {}", symbol, detail);
            ApiError::NotFound(format!("No candle data for symbol {}", symbol))
        }
        other => other.into(),
    })?;

    let (next, previous) = page_links(
        &base_url(&headers, &uri),
        limit,
        request.cursor.is_some(),
        &page,
    );

    Ok(Json(PaginatedCandleResponse {
        count: page.total_count,
        next,
        previous,
        results: page.records,
    }))
}

/// 使交易对的内存数据集失效
///
/// 下一次请求会从数据文件重新加载。
#[utoipa::path(
    post,
    path = "/api/v1/pairs/{symbol}/reload",
    tag = "行情 (Pairs)",
    params(
        ("symbol" = String, Path, description = "交易对代码")
    ),
    responses(
        (status = 200, description = "已失效", body = MessageResponse)
    )
)]
pub async fn reload_pair(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<MessageResponse> {
    let symbol = normalize_symbol(&symbol);
    let message = if state.datasets.invalidate(&symbol) {
        format!("Dataset for {} will be reloaded on next request", symbol)
    } else {
        format!("Dataset for {} was not loaded", symbol)
    };
    Json(MessageResponse::new(message))
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    raw.map(|value| {
        parse_iso8601(value)
            .ok_or_else(|| ApiError::BadRequest(format!("{} is not a valid ISO-8601 date", field)))
    })
    .transpose()
}

/// 以请求的 Host 头与路径拼出不含查询串的基础 URL。
fn base_url(headers: &HeaderMap, uri: &Uri) -> String {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header_str("x-forwarded-proto").unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}{}", scheme, host, uri.path())
}

/// # Summary
/// 按翻页链接策略生成 `next`/`previous` URL。
///
/// # Logic
/// 1. 仅当本页条数恰好等于 `limit` 时才给出 `next`（可能还有更多数据）。
/// 2. 仅当原请求携带游标时才给出 `previous`（无游标即已处于最新一端）。
/// 3. 引擎总会返回两个游标，是否公布链接完全由这里决定。
pub fn page_links(
    base_url: &str,
    limit: usize,
    request_had_cursor: bool,
    page: &PageResult,
) -> (Option<String>, Option<String>) {
    let next = page
        .next_cursor
        .filter(|_| page.records.len() == limit)
        .map(|cursor| format!("{}?cursor={}&limit={}&direction=next", base_url, cursor, limit));
    let previous = page
        .prev_cursor
        .filter(|_| request_had_cursor)
        .map(|cursor| format!("{}?cursor={}&limit={}&direction=prev", base_url, cursor, limit));
    (next, previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartdesk_core::market::entity::Candle;

    fn page(times: &[i64]) -> PageResult {
        let records: Vec<Candle> = times
            .iter()
            .map(|&time| Candle {
                time,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1,
            })
            .collect();
        PageResult {
            total_count: records.len(),
            next_cursor: records.last().map(|c| c.time),
            prev_cursor: records.first().map(|c| c.time),
            records,
        }
    }

    const BASE: &str = "http://localhost:8000/api/v1/pairs/EURUSD/candles";

    #[test]
    fn test_full_page_with_cursor_has_both_links() {
        let (next, previous) = page_links(BASE, 2, true, &page(&[300, 400]));
        assert_eq!(
            next.as_deref(),
            Some("http://localhost:8000/api/v1/pairs/EURUSD/candles?cursor=400&limit=2&direction=next")
        );
        assert_eq!(
            previous.as_deref(),
            Some("http://localhost:8000/api/v1/pairs/EURUSD/candles?cursor=300&limit=2&direction=prev")
        );
    }

    #[test]
    fn test_short_page_has_no_next() {
        let (next, previous) = page_links(BASE, 3, true, &page(&[300, 400]));
        assert!(next.is_none());
        assert!(previous.is_some());
    }

    #[test]
    fn test_no_cursor_suppresses_previous() {
        let (next, previous) = page_links(BASE, 2, false, &page(&[400, 500]));
        assert!(next.is_some());
        assert!(previous.is_none());
    }

    #[test]
    fn test_empty_page_has_no_links() {
        let (next, previous) = page_links(BASE, 2, true, &page(&[]));
        assert!(next.is_none());
        assert!(previous.is_none());
    }

    #[test]
    fn test_base_url_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "example.com:8000".parse().unwrap());
        let uri: Uri = "/api/v1/pairs/EURUSD/candles?limit=5".parse().unwrap();
        assert_eq!(
            base_url(&headers, &uri),
            "http://example.com:8000/api/v1/pairs/EURUSD/candles"
        );
    }

    #[test]
    fn test_parse_date_errors() {
        assert_eq!(parse_date("start_date", None).unwrap(), None);
        assert_eq!(
            parse_date("start_date", Some("2024-01-01T00:00:00Z")).unwrap(),
            Some(1_704_067_200)
        );
        assert!(matches!(
            parse_date("end_date", Some("soon")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
