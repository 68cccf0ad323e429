use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use watchdog_core::{Clock, RecordStore, SystemClock, WatchdogConfig};
use watchdog_monitor::{HealthCheck, LivenessMonitor, LivenessMonitorService};
use watchdog_notifier::build_channels;
use watchdog_worker::{HeartbeatWriter, LockOptions, WorkerLock};

/// 根据配置组装存活监控
pub fn build_monitor(config: &WatchdogConfig, clock: Arc<dyn Clock>) -> Result<LivenessMonitor> {
    let channels = build_channels(&config.notifiers).context("构建通知渠道失败")?;
    let store = RecordStore::from_config(&config.records);

    info!(
        heartbeat = %store.heartbeat_path().display(),
        lock = %store.lock_path().display(),
        channels = channels.len(),
        "存活监控已就绪"
    );

    Ok(LivenessMonitor::new(
        config.monitor.clone(),
        store,
        channels,
        clock,
    ))
}

/// 存活监控应用
pub struct MonitorApp {
    monitor: Arc<LivenessMonitor>,
}

impl MonitorApp {
    pub fn new(config: &WatchdogConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &WatchdogConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            monitor: Arc::new(build_monitor(config, clock)?),
        })
    }

    pub fn monitor(&self) -> &Arc<LivenessMonitor> {
        &self.monitor
    }

    /// 只检测一次
    pub async fn check_once(&self) -> HealthCheck {
        self.monitor.check_health().await
    }

    /// 在后台运行监控循环
    pub fn spawn(&self, shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let monitor = Arc::clone(&self.monitor);
        tokio::spawn(async move { monitor.run(shutdown_rx).await })
    }
}

/// 被监控Worker：持有独占锁并周期写入心跳
pub struct WorkerApp {
    lock: WorkerLock,
    writer: HeartbeatWriter,
    beat_interval: Duration,
}

impl WorkerApp {
    /// 获取锁，锁被其他Worker持有时返回 `WatchdogError::LockHeld`
    pub async fn start(
        config: &WatchdogConfig,
        worker_id: &str,
        pid: u32,
        clock: Arc<dyn Clock>,
    ) -> watchdog_core::WatchdogResult<Self> {
        let store = RecordStore::from_config(&config.records);
        let options = LockOptions::from_config(&config.worker, config.monitor.stale_threshold_ms);
        let lock = WorkerLock::acquire(store.clone(), worker_id, pid, options, clock.as_ref()).await?;
        let writer = HeartbeatWriter::new(store, pid, worker_id, clock);

        Ok(Self {
            lock,
            writer,
            beat_interval: Duration::from_millis(config.worker.beat_interval_ms),
        })
    }

    pub fn lock(&self) -> &WorkerLock {
        &self.lock
    }

    /// 在后台写入心跳，直到收到关闭信号
    pub fn spawn_heartbeat(&self, shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        self.writer.clone().spawn(self.beat_interval, shutdown_rx)
    }

    /// 释放锁并删除心跳文件
    pub async fn stop(mut self) -> Result<()> {
        self.lock.release().await.context("释放Worker锁失败")?;
        Ok(())
    }
}
