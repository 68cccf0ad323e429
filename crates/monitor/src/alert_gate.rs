/// 告警冷却闸门
///
/// 只在成功分发后记录时间；进程内有效，重启即重置。
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown_ms: i64,
    last_alert_ms: Option<i64>,
}

impl AlertGate {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms: i64::try_from(cooldown_ms).unwrap_or(i64::MAX),
            last_alert_ms: None,
        }
    }

    /// 冷却期内返回剩余毫秒数
    pub fn cooldown_remaining(&self, now_ms: i64) -> Option<i64> {
        let last = self.last_alert_ms?;
        let since = now_ms.saturating_sub(last);
        (since < self.cooldown_ms).then(|| self.cooldown_ms.saturating_sub(since))
    }

    pub fn record_dispatch(&mut self, now_ms: i64) {
        self.last_alert_ms = Some(now_ms);
    }

    pub fn last_alert_ms(&self) -> Option<i64> {
        self.last_alert_ms
    }
}
