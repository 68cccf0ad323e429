use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use watchdog_core::{Clock, HeartbeatRecord, RecordStore, WatchdogResult};

/// 周期性覆盖写入心跳文件
#[derive(Clone)]
pub struct HeartbeatWriter {
    store: RecordStore,
    pid: u32,
    worker_id: String,
    clock: Arc<dyn Clock>,
}

impl HeartbeatWriter {
    pub fn new<S: Into<String>>(
        store: RecordStore,
        pid: u32,
        worker_id: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            pid,
            worker_id: worker_id.into(),
            clock,
        }
    }

    /// 写入一次心跳
    pub async fn beat(&self) -> WatchdogResult<HeartbeatRecord> {
        let record = HeartbeatRecord::new(self.pid, self.worker_id.clone(), self.clock.now_ms());
        self.store.write_heartbeat(&record).await?;
        debug!(last_beat = record.last_beat, "心跳已写入");
        Ok(record)
    }

    /// 立即写入一次心跳，之后按间隔写入，直到收到关闭信号
    pub fn spawn(
        self,
        beat_interval: Duration,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(beat_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.beat().await {
                            error!("Failed to write heartbeat: {}", e);
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Heartbeat task shutting down");
                        break;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for HeartbeatWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatWriter")
            .field("pid", &self.pid)
            .field("worker_id", &self.worker_id)
            .field("heartbeat_path", &self.store.heartbeat_path())
            .finish()
    }
}
