use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat, Map};

use super::models::WatchdogConfig;
use crate::{WatchdogError, WatchdogResult};

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/watchdog.toml",
    "watchdog.toml",
    "/etc/watchdog/config.toml",
];

impl WatchdogConfig {
    /// 加载配置：TOML文件（可选）+ `WATCHDOG_` 前缀的环境变量
    ///
    /// 嵌套字段用 `__` 分隔，例如 `WATCHDOG_MONITOR__STALE_THRESHOLD_MS=90000`。
    /// 未指定路径且默认位置都不存在时使用内置默认值。
    pub fn load(config_path: Option<&str>) -> WatchdogResult<Self> {
        Self::load_with_env(config_path, None)
    }

    /// 与 `load` 相同，但可以用给定的键值表代替进程环境变量
    pub fn load_with_env(
        config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> WatchdogResult<Self> {
        let mut builder = ConfigBuilder::builder();

        match config_path {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(WatchdogError::config_error(format!(
                        "配置文件不存在: {path}"
                    )));
                }
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
            None => {
                if let Some(path) = DEFAULT_CONFIG_PATHS
                    .iter()
                    .find(|path| Path::new(path).exists())
                {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WATCHDOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: WatchdogConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> WatchdogResult<Self> {
        let config: WatchdogConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> WatchdogResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| WatchdogError::Serialization(format!("序列化配置为TOML失败: {e}")))
    }
}
