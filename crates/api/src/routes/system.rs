/// 健康检查
#[utoipa::path(
    get,
    path = "/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务正常", body = String)
    )
)]
pub async fn health() -> &'static str {
    "ok"
}
