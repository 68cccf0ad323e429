use std::fmt;

use serde::{Deserialize, Serialize};

pub const NO_LOCK_ALERT: &str = "🚨 Task Worker DOWN - No lock file found!";
pub const NO_HEARTBEAT_ALERT: &str = "🚨 Task Worker DOWN - No heartbeat file!";

/// Worker健康状态分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    DownNoLock,
    DownNoHeartbeat,
    Stale,
    Healthy,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::DownNoLock => "DOWN_NO_LOCK",
            HealthState::DownNoHeartbeat => "DOWN_NO_HEARTBEAT",
            HealthState::Stale => "STALE",
            HealthState::Healthy => "HEALTHY",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次检测得出的Worker健康结论，每次轮询重新计算
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerHealth {
    /// 锁文件不存在或无法解析
    DownNoLock,
    /// 锁存在，但心跳文件不存在或无法解析
    DownNoHeartbeat { lock_pid: u32 },
    /// 心跳超过阈值未更新
    Stale {
        pid: u32,
        heartbeat_pid: u32,
        elapsed_ms: i64,
    },
    Healthy {
        pid: u32,
        heartbeat_pid: u32,
        elapsed_ms: i64,
    },
}

impl WorkerHealth {
    pub fn state(&self) -> HealthState {
        match self {
            WorkerHealth::DownNoLock => HealthState::DownNoLock,
            WorkerHealth::DownNoHeartbeat { .. } => HealthState::DownNoHeartbeat,
            WorkerHealth::Stale { .. } => HealthState::Stale,
            WorkerHealth::Healthy { .. } => HealthState::Healthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, WorkerHealth::Healthy { .. })
    }

    /// 锁记录中的PID，锁缺失时为 `None`
    pub fn lock_pid(&self) -> Option<u32> {
        match self {
            WorkerHealth::DownNoLock => None,
            WorkerHealth::DownNoHeartbeat { lock_pid } => Some(*lock_pid),
            WorkerHealth::Stale { pid, .. } | WorkerHealth::Healthy { pid, .. } => Some(*pid),
        }
    }

    /// 锁PID与心跳PID不一致（仅在两份记录都可读时有意义）
    pub fn pid_mismatch(&self) -> bool {
        match self {
            WorkerHealth::Stale {
                pid, heartbeat_pid, ..
            }
            | WorkerHealth::Healthy {
                pid, heartbeat_pid, ..
            } => pid != heartbeat_pid,
            _ => false,
        }
    }

    /// 需要发送给运维人员的告警文本，健康状态下为 None
    pub fn alert_message(&self) -> Option<String> {
        match self {
            WorkerHealth::DownNoLock => Some(NO_LOCK_ALERT.to_string()),
            WorkerHealth::DownNoHeartbeat { .. } => Some(NO_HEARTBEAT_ALERT.to_string()),
            WorkerHealth::Stale {
                pid,
                heartbeat_pid,
                elapsed_ms,
            } => {
                let mut message = format!(
                    "🚨 Task Worker STALE - No heartbeat for {}s\nPID: {}",
                    round_secs(*elapsed_ms),
                    pid
                );
                if pid != heartbeat_pid {
                    message.push_str(&format!("\nHeartbeat PID: {heartbeat_pid}"));
                }
                Some(message)
            }
            WorkerHealth::Healthy { .. } => None,
        }
    }

    /// 每次轮询输出的状态行
    pub fn status_line(&self) -> String {
        match self {
            WorkerHealth::Healthy { elapsed_ms, .. } => {
                format!("Worker healthy - heartbeat {}s ago", round_secs(*elapsed_ms))
            }
            WorkerHealth::Stale { elapsed_ms, .. } => format!(
                "Worker {} - heartbeat {}s ago",
                self.state(),
                round_secs(*elapsed_ms)
            ),
            other => format!("Worker {}", other.state()),
        }
    }
}

/// 毫秒换算为秒并四舍五入，.5 一律向正无穷取整（-1500ms 为 -1s）
pub fn round_secs(elapsed_ms: i64) -> i64 {
    (elapsed_ms as f64 / 1000.0 + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_secs() {
        assert_eq!(round_secs(150_000), 150);
        assert_eq!(round_secs(1_499), 1);
        assert_eq!(round_secs(1_500), 2);
        assert_eq!(round_secs(0), 0);
    }

    #[test]
    fn test_round_secs_negative_half_rounds_up() {
        assert_eq!(round_secs(-1_500), -1);
        assert_eq!(round_secs(-1_501), -2);
        assert_eq!(round_secs(-499), 0);
    }

    #[test]
    fn test_stale_alert_message() {
        let health = WorkerHealth::Stale {
            pid: 12345,
            heartbeat_pid: 12345,
            elapsed_ms: 150_000,
        };
        assert_eq!(
            health.alert_message().as_deref(),
            Some("🚨 Task Worker STALE - No heartbeat for 150s\nPID: 12345")
        );
        assert!(!health.pid_mismatch());
    }

    #[test]
    fn test_stale_alert_message_with_pid_mismatch() {
        let health = WorkerHealth::Stale {
            pid: 100,
            heartbeat_pid: 200,
            elapsed_ms: 121_000,
        };
        let message = health.alert_message().unwrap();
        assert!(message.contains("PID: 100"));
        assert!(message.ends_with("Heartbeat PID: 200"));
        assert!(health.pid_mismatch());
    }

    #[test]
    fn test_down_messages() {
        assert_eq!(
            WorkerHealth::DownNoLock.alert_message().as_deref(),
            Some(NO_LOCK_ALERT)
        );
        assert_eq!(
            WorkerHealth::DownNoHeartbeat { lock_pid: 1 }
                .alert_message()
                .as_deref(),
            Some(NO_HEARTBEAT_ALERT)
        );
    }

    #[test]
    fn test_healthy_has_no_alert() {
        let health = WorkerHealth::Healthy {
            pid: 1,
            heartbeat_pid: 1,
            elapsed_ms: 5_400,
        };
        assert!(health.is_healthy());
        assert!(health.alert_message().is_none());
        assert_eq!(health.status_line(), "Worker healthy - heartbeat 5s ago");
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(HealthState::DownNoLock.to_string(), "DOWN_NO_LOCK");
        assert_eq!(
            serde_json::to_string(&HealthState::DownNoHeartbeat).unwrap(),
            "\"DOWN_NO_HEARTBEAT\""
        );
        assert_eq!(WorkerHealth::DownNoLock.status_line(), "Worker DOWN_NO_LOCK");
    }
}
