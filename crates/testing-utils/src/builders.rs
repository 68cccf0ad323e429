use watchdog_core::{HeartbeatRecord, LockRecord, MonitorConfig};

/// 心跳记录构造器，默认 pid=12345, worker_id="test-worker"
pub struct HeartbeatBuilder {
    record: HeartbeatRecord,
}

impl HeartbeatBuilder {
    pub fn new(last_beat: i64) -> Self {
        Self {
            record: HeartbeatRecord::new(12345, "test-worker", last_beat),
        }
    }

    /// `now_ms` 之前 `age_ms` 毫秒的心跳
    pub fn aged(now_ms: i64, age_ms: i64) -> Self {
        Self::new(now_ms - age_ms)
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.record.pid = pid;
        self
    }

    pub fn with_worker_id(mut self, worker_id: &str) -> Self {
        self.record.worker_id = worker_id.to_string();
        self
    }

    pub fn build(self) -> HeartbeatRecord {
        self.record
    }
}

pub fn lock_for(pid: u32) -> LockRecord {
    LockRecord::new(pid, "test-worker")
}

/// 与生产默认值相同的监控配置
pub fn monitor_config() -> MonitorConfig {
    MonitorConfig::default()
}
