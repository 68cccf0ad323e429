use async_trait::async_trait;
use tracing::info;
use watchdog_core::WatchdogResult;

use crate::Notifier;

pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()> {
        info!(
            channel = %self.name,
            target = %target,
            message = %message,
            "Alert notification sent"
        );
        Ok(())
    }
}
