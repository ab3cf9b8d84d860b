use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的前端地址
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// # Summary
/// K 线数据文件配置。
///
/// # Invariants
/// - `file_pattern` 中的 `{symbol}` 占位符会被替换为大写交易对代码。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: String,
    pub file_pattern: String,
    /// 对外公布的交易对列表
    pub symbols: Vec<String>,
}

impl DataConfig {
    /// 解析指定交易对对应的 CSV 文件路径。
    pub fn csv_path(&self, symbol: &str) -> PathBuf {
        let file_name = self
            .file_pattern
            .replace("{symbol}", &crate::common::normalize_symbol(symbol));
        PathBuf::from(&self.data_dir).join(file_name)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            file_pattern: "{symbol}_15m_1year.csv".to_string(),
            symbols: vec!["EURUSD".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl PaginationConfig {
    /// # Summary
    /// 将客户端传入的 limit 裁剪到 `[1, max_limit]`。
    ///
    /// # Logic
    /// 1. 未传入时使用 `default_limit`（同样受 `max_limit` 约束）。
    /// 2. 非正数提升为 1，超过上限降为 `max_limit`。
    pub fn clamp_limit(&self, requested: Option<i64>) -> usize {
        let max = self.max_limit.max(1);
        match requested {
            None => self.default_limit.clamp(1, max),
            Some(n) if n < 1 => 1,
            Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 500,
            max_limit: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// 日志文件目录，为空时仅输出到终端
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.pagination.default_limit, 500);
        assert_eq!(config.pagination.max_limit, 5000);
        assert_eq!(config.database.data_dir, "data");
        assert_eq!(config.data.symbols, vec!["EURUSD".to_string()]);
    }

    #[test]
    fn test_csv_path() {
        let data = DataConfig::default();
        assert_eq!(
            data.csv_path("eurusd"),
            PathBuf::from("data").join("EURUSD_15m_1year.csv")
        );
    }

    #[test]
    fn test_clamp_limit() {
        let p = PaginationConfig::default();
        assert_eq!(p.clamp_limit(None), 500);
        assert_eq!(p.clamp_limit(Some(0)), 1);
        assert_eq!(p.clamp_limit(Some(-3)), 1);
        assert_eq!(p.clamp_limit(Some(42)), 42);
        assert_eq!(p.clamp_limit(Some(1_000_000)), 5000);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "server": { "port": 9000 } }"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.pagination.max_limit, 5000);
    }
}
