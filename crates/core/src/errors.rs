use thiserror::Error;

/// Watchdog错误类型定义
#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("通知渠道 {channel} 发送失败: {message}")]
    Notification { channel: String, message: String },

    #[error("操作超时: {0}")]
    Timeout(String),

    #[error("Worker锁已被占用: pid={pid}, worker_id={worker_id}")]
    LockHeld { pid: u32, worker_id: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type WatchdogResult<T> = Result<T, WatchdogError>;

impl WatchdogError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn notification<C: Into<String>, M: Into<String>>(channel: C, message: M) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn lock_held<S: Into<String>>(pid: u32, worker_id: S) -> Self {
        Self::LockHeld {
            pid,
            worker_id: worker_id.into(),
        }
    }

    /// 配置错误和内部错误无法通过重试恢复
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WatchdogError::Configuration(_) | WatchdogError::Internal(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WatchdogError::Io(_)
                | WatchdogError::Notification { .. }
                | WatchdogError::Timeout(_)
                | WatchdogError::LockHeld { .. }
        )
    }
}

impl From<serde_json::Error> for WatchdogError {
    fn from(err: serde_json::Error) -> Self {
        WatchdogError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for WatchdogError {
    fn from(err: config::ConfigError) -> Self {
        WatchdogError::Configuration(err.to_string())
    }
}

impl From<toml::de::Error> for WatchdogError {
    fn from(err: toml::de::Error) -> Self {
        WatchdogError::Configuration(err.to_string())
    }
}

impl From<anyhow::Error> for WatchdogError {
    fn from(err: anyhow::Error) -> Self {
        WatchdogError::Internal(err.to_string())
    }
}
