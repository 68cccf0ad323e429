use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use watchdog_core::{
    is_process_alive, Clock, LockRecord, RecordRead, RecordStore, WatchdogError, WatchdogResult,
    WorkerConfig,
};

/// 获取锁的重试参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// 最多尝试次数
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// 持有者心跳超过该时长即视为失效，可回收其锁
    pub stale_threshold_ms: u64,
}

impl LockOptions {
    pub fn from_config(config: &WorkerConfig, stale_threshold_ms: u64) -> Self {
        Self {
            max_retries: config.lock_max_retries,
            retry_delay_ms: config.lock_retry_delay_ms,
            stale_threshold_ms,
        }
    }
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 150,
            stale_threshold_ms: 120_000,
        }
    }
}

/// 已持有的Worker独占锁
#[derive(Debug)]
pub struct WorkerLock {
    store: RecordStore,
    record: LockRecord,
    released: bool,
}

impl WorkerLock {
    /// 独占创建锁文件
    ///
    /// 锁已存在时，若持有者进程已退出，或持有者（同一pid）的心跳已失效，
    /// 则清理其锁文件后重试；只清理文件，不会终止任何进程。
    /// 重试用尽仍未获得锁时返回 `LockHeld`。
    pub async fn acquire(
        store: RecordStore,
        worker_id: &str,
        pid: u32,
        options: LockOptions,
        clock: &dyn Clock,
    ) -> WatchdogResult<Self> {
        let record = LockRecord::new(pid, worker_id).with_started(Utc::now());
        let attempts = options.max_retries.max(1);
        let mut last_error = WatchdogError::lock_held(0, "");

        for attempt in 1..=attempts {
            match store.create_lock(&record).await {
                Ok(()) => {
                    info!(
                        "Worker锁获取成功: {} (PID {})",
                        store.lock_path().display(),
                        pid
                    );
                    return Ok(Self {
                        store,
                        record,
                        released: false,
                    });
                }
                Err(WatchdogError::LockHeld {
                    pid: holder_pid,
                    worker_id: holder_id,
                }) => {
                    if Self::reclaim_if_stale(&store, holder_pid, options, clock).await? {
                        continue;
                    }
                    last_error = WatchdogError::lock_held(holder_pid, holder_id);
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(options.retry_delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        info!("另一个Worker正在运行: {}", last_error);
        Err(last_error)
    }

    /// 锁持有者进程已不存在时删除锁文件；
    /// 持有者（同一pid）心跳超过阈值时删除锁和心跳文件
    async fn reclaim_if_stale(
        store: &RecordStore,
        holder_pid: u32,
        options: LockOptions,
        clock: &dyn Clock,
    ) -> WatchdogResult<bool> {
        if !is_process_alive(holder_pid) {
            warn!(holder_pid, "锁持有者进程已不存在（orphaned lock），回收锁文件");
            store.remove_lock().await?;
            return Ok(true);
        }

        let heartbeat = match store.read_heartbeat().await {
            RecordRead::Present(heartbeat) if heartbeat.pid == holder_pid => heartbeat,
            _ => return Ok(false),
        };

        let elapsed_ms = heartbeat.elapsed_ms(clock.now_ms());
        let threshold_ms = i64::try_from(options.stale_threshold_ms).unwrap_or(i64::MAX);
        if elapsed_ms <= threshold_ms {
            return Ok(false);
        }

        warn!(
            holder_pid,
            elapsed_ms, "锁持有者心跳已失效，回收锁文件（不终止进程）"
        );
        store.remove_lock().await?;
        store.remove_heartbeat().await?;
        Ok(true)
    }

    pub fn pid(&self) -> u32 {
        self.record.pid
    }

    pub fn worker_id(&self) -> &str {
        &self.record.worker_id
    }

    pub fn record(&self) -> &LockRecord {
        &self.record
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// 删除锁和心跳文件，可重复调用
    ///
    /// 锁已被其他进程回收并重新创建时不删除。
    pub async fn release(&mut self) -> WatchdogResult<()> {
        if self.released {
            return Ok(());
        }

        match self.store.read_lock().await {
            RecordRead::Present(current) if current.pid != self.record.pid => {
                warn!(
                    "锁文件已属于其他进程 (PID {})，跳过删除",
                    current.pid
                );
            }
            _ => {
                self.store.remove_lock().await?;
                self.store.remove_heartbeat().await?;
                info!("Worker锁已释放");
            }
        }

        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_options_from_config() {
        let config = WorkerConfig::default();
        let options = LockOptions::from_config(&config, 90_000);

        assert_eq!(options.max_retries, 3);
        assert_eq!(options.retry_delay_ms, 150);
        assert_eq!(options.stale_threshold_ms, 90_000);
    }
}
