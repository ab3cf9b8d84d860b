use thiserror::Error;

/// # Summary
/// 行情数据域错误枚举。
///
/// # Invariants
/// - `NotFound`: 未知交易对或缺失底层数据文件，修正配置前重试无意义。
/// - `InvalidArgument`: 非法方向或非正 limit，调用方需修正请求。
/// - `Internal`: 加载或解析阶段的意外失败，记录日志后以通用信息返回。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    // 请求的数据不存在
    #[error("Not found: {0}")]
    NotFound(String),
    // 请求参数不合法
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    // 内部错误，如数据文件损坏
    #[error("Internal error: {0}")]
    Internal(String),
}
