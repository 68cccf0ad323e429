use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker心跳记录
///
/// 由Worker在每次心跳时整体覆盖写入，监控端只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRecord {
    pub pid: u32,
    #[serde(default)]
    pub worker_id: String,
    /// 最近一次心跳时间（毫秒时间戳）
    pub last_beat: i64,
}

impl HeartbeatRecord {
    pub fn new<S: Into<String>>(pid: u32, worker_id: S, last_beat: i64) -> Self {
        Self {
            pid,
            worker_id: worker_id.into(),
            last_beat,
        }
    }

    /// 距离最近一次心跳经过的毫秒数，心跳时间在未来时为负数
    ///
    /// 极端的 `lastBeat` 取值饱和到 `i64` 边界，不会回绕。
    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_beat)
    }
}

/// Worker独占锁记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub pid: u32,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
}

impl LockRecord {
    pub fn new<S: Into<String>>(pid: u32, worker_id: S) -> Self {
        Self {
            pid,
            worker_id: worker_id.into(),
            started: None,
        }
    }

    pub fn with_started(mut self, started: DateTime<Utc>) -> Self {
        self.started = Some(started);
        self
    }
}
