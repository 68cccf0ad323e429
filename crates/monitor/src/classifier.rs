use watchdog_core::{HeartbeatRecord, LockRecord, WorkerHealth};

/// 根据锁记录与心跳记录判定Worker健康状态
///
/// 判定顺序：锁缺失 > 心跳缺失 > 心跳过期 > 健康。
/// 过期条件为 `now - last_beat > stale_threshold_ms`，恰好等于阈值仍视为健康。
pub fn classify(
    lock: Option<&LockRecord>,
    heartbeat: Option<&HeartbeatRecord>,
    now_ms: i64,
    stale_threshold_ms: u64,
) -> WorkerHealth {
    let Some(lock) = lock else {
        return WorkerHealth::DownNoLock;
    };

    let Some(heartbeat) = heartbeat else {
        return WorkerHealth::DownNoHeartbeat { lock_pid: lock.pid };
    };

    let elapsed_ms = heartbeat.elapsed_ms(now_ms);
    let threshold_ms = i64::try_from(stale_threshold_ms).unwrap_or(i64::MAX);
    if elapsed_ms > threshold_ms {
        WorkerHealth::Stale {
            pid: lock.pid,
            heartbeat_pid: heartbeat.pid,
            elapsed_ms,
        }
    } else {
        WorkerHealth::Healthy {
            pid: lock.pid,
            heartbeat_pid: heartbeat.pid,
            elapsed_ms,
        }
    }
}
