use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{WatchdogError, WatchdogResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchdogConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notifiers: Vec<NotifierConfig>,
}

/// 存活监控配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 心跳过期阈值（毫秒）
    pub stale_threshold_ms: u64,
    /// 检测间隔（毫秒）
    pub check_interval_ms: u64,
    /// 两次告警之间的最短间隔（毫秒）
    pub alert_cooldown_ms: u64,
    /// 单个通知渠道的发送超时（毫秒）
    pub notify_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stale_threshold_ms: 120_000,
            check_interval_ms: 60_000,
            alert_cooldown_ms: 300_000,
            notify_timeout_ms: 10_000,
        }
    }
}

/// 心跳文件与锁文件位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    pub heartbeat_path: PathBuf,
    pub lock_path: PathBuf,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            heartbeat_path: tmp.join("task-worker.heartbeat"),
            lock_path: tmp.join("task-worker.lock"),
        }
    }
}

/// 参考Worker（heartbeat-worker）使用的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub beat_interval_ms: u64,
    pub lock_max_retries: u32,
    pub lock_retry_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            beat_interval_ms: 60_000,
            lock_max_retries: 3,
            lock_retry_delay_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "text" => Ok(LogFormat::Text),
            _ => Err(format!(
                "Invalid log format: {s}. Valid formats: json, pretty, text"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// 通知渠道配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// 通过聊天桥接命令行发送，`args` 中的 `{target}`、`{message}` 会被替换
    Command {
        name: String,
        target: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Slack风格的 incoming webhook
    Webhook {
        name: String,
        #[serde(default)]
        target: String,
        url: String,
        #[serde(default)]
        username: Option<String>,
    },
    /// 仅写日志
    Log {
        name: String,
        #[serde(default)]
        target: String,
    },
}

impl NotifierConfig {
    pub fn name(&self) -> &str {
        match self {
            NotifierConfig::Command { name, .. }
            | NotifierConfig::Webhook { name, .. }
            | NotifierConfig::Log { name, .. } => name,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            NotifierConfig::Command { target, .. }
            | NotifierConfig::Webhook { target, .. }
            | NotifierConfig::Log { target, .. } => target,
        }
    }

    fn validate(&self) -> WatchdogResult<()> {
        if self.name().trim().is_empty() {
            return Err(WatchdogError::config_error("通知渠道名称不能为空"));
        }
        match self {
            NotifierConfig::Command { name, program, .. } => {
                if program.trim().is_empty() {
                    return Err(WatchdogError::config_error(format!(
                        "通知渠道 {name} 的 program 不能为空"
                    )));
                }
            }
            NotifierConfig::Webhook { name, url, .. } => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(WatchdogError::config_error(format!(
                        "通知渠道 {name} 的 webhook 地址无效: {url}"
                    )));
                }
            }
            NotifierConfig::Log { .. } => {}
        }
        Ok(())
    }
}

impl WatchdogConfig {
    pub fn validate(&self) -> WatchdogResult<()> {
        let monitor = &self.monitor;
        if monitor.stale_threshold_ms == 0 {
            return Err(WatchdogError::config_error("stale_threshold_ms 必须大于0"));
        }
        for (field, value) in [
            ("stale_threshold_ms", monitor.stale_threshold_ms),
            ("alert_cooldown_ms", monitor.alert_cooldown_ms),
        ] {
            if i64::try_from(value).is_err() {
                return Err(WatchdogError::config_error(format!(
                    "{field} 超出范围: {value}"
                )));
            }
        }
        if monitor.check_interval_ms == 0 {
            return Err(WatchdogError::config_error("check_interval_ms 必须大于0"));
        }
        if monitor.notify_timeout_ms == 0 {
            return Err(WatchdogError::config_error("notify_timeout_ms 必须大于0"));
        }
        if self.worker.beat_interval_ms == 0 {
            return Err(WatchdogError::config_error("beat_interval_ms 必须大于0"));
        }
        if self.worker.lock_max_retries == 0 {
            return Err(WatchdogError::config_error("lock_max_retries 必须大于0"));
        }

        let mut names = HashSet::new();
        for notifier in &self.notifiers {
            notifier.validate()?;
            if !names.insert(notifier.name()) {
                return Err(WatchdogError::config_error(format!(
                    "通知渠道名称重复: {}",
                    notifier.name()
                )));
            }
        }
        Ok(())
    }
}
