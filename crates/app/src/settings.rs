//! 配置加载：默认值 → 配置文件 → 环境变量，逐层覆盖。

use std::path::Path;

use chartdesk_core::config::AppConfig;
use config::{Config, ConfigError, Environment, File};

/// 默认配置文件 (可缺省)
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
/// 指定额外配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "CHARTDESK_CONFIG";

/// # Summary
/// 按层级合并配置源并反序列化为 `AppConfig`。
///
/// # Logic
/// 1. `AppConfig::default()` 提供全部缺省值 (字段级 `serde(default)`)。
/// 2. `config/default.toml` 存在时覆盖缺省值。
/// 3. `extra` 指向的文件必须存在，覆盖前两层。
/// 4. `CHARTDESK_<SECTION>__<KEY>` 环境变量优先级最高，列表用逗号分隔。
pub fn load_config(base_dir: &Path, extra: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::from(base_dir.join(DEFAULT_CONFIG_FILE)).required(false));

    if let Some(path) = extra {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix("CHARTDESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .with_list_parse_key("data.symbols"),
        )
        .build()?
        .try_deserialize()
}
