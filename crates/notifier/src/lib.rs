//! 告警通知渠道
//!
//! 监控核心只依赖 [`Notifier`] 的 `send(target, message)` 约定，
//! 具体渠道（聊天桥接命令、Webhook、日志）在这里实现。

pub mod channel;
pub mod command;
pub mod factory;
pub mod log;
pub mod webhook;

use async_trait::async_trait;
use watchdog_core::WatchdogResult;

pub use channel::{dispatch_all, DispatchReport, NotificationChannel};
pub use command::CommandNotifier;
pub use factory::build_channels;
pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

/// 通知发送能力
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 向 `target` 发送一条告警，失败返回 `WatchdogError::Notification`
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()>;
}
