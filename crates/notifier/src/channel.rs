use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use watchdog_core::{WatchdogError, WatchdogResult};

use crate::Notifier;

/// 一个具名通知渠道：发送能力 + 该渠道上的目标标识
#[derive(Clone)]
pub struct NotificationChannel {
    name: String,
    target: String,
    notifier: Arc<dyn Notifier>,
}

impl NotificationChannel {
    pub fn new<N: Into<String>, T: Into<String>>(
        name: N,
        target: T,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            notifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// 发送一条告警，超过 `timeout` 视为失败
    pub async fn send(&self, message: &str, timeout: Duration) -> WatchdogResult<()> {
        match tokio::time::timeout(timeout, self.notifier.send(&self.target, message)).await {
            Ok(result) => result,
            Err(_) => Err(WatchdogError::timeout(format!(
                "通知渠道 {} 发送超时 ({}ms)",
                self.name,
                timeout.as_millis()
            ))),
        }
    }
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish()
    }
}

/// 一次分发的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    /// (渠道名, 错误描述)
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    /// 所有已配置的渠道都失败了
    pub fn all_failed(&self) -> bool {
        self.delivered.is_empty() && !self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// 依次向所有渠道发送，单个渠道失败或超时不影响其余渠道
pub async fn dispatch_all(
    channels: &[NotificationChannel],
    message: &str,
    timeout: Duration,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for channel in channels {
        match channel.send(message, timeout).await {
            Ok(()) => {
                info!(channel = %channel.name(), "告警已发送");
                report.delivered.push(channel.name().to_string());
            }
            Err(e) => {
                error!(channel = %channel.name(), "Failed to send alert: {}", e);
                report.failed.push((channel.name().to_string(), e.to_string()));
            }
        }
    }

    report
}
