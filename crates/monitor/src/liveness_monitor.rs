use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use watchdog_core::models::round_secs;
use watchdog_core::{
    is_process_alive, Clock, HeartbeatRecord, LockRecord, MonitorConfig, RecordRead, RecordStore,
    WorkerHealth,
};
use watchdog_notifier::{dispatch_all, DispatchReport, NotificationChannel};

use crate::alert_gate::AlertGate;
use crate::classifier::classify;

/// 一次告警尝试的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// 至少一个渠道送达（或没有配置任何渠道），冷却期开始计时
    Sent(DispatchReport),
    /// 冷却期内，未发送
    Suppressed { remaining_ms: i64 },
    /// 所有渠道都失败，冷却状态不变
    Failed(DispatchReport),
}

/// 一次健康检测的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub health: WorkerHealth,
    pub alert: Option<AlertOutcome>,
    /// 锁文件存在但持有者进程已退出；仅作诊断，不影响状态判定
    pub orphaned_lock: bool,
}

/// Worker存活监控服务接口
#[async_trait]
pub trait LivenessMonitorService: Send + Sync {
    /// 读取锁与心跳记录，判定状态，必要时发送告警
    async fn check_health(&self) -> HealthCheck;

    /// 经冷却闸门向所有渠道发送告警
    async fn send_alert(&self, message: &str) -> AlertOutcome;

    /// 立即检测一次，之后按固定间隔检测，直到收到关闭信号
    async fn run(&self, shutdown_rx: broadcast::Receiver<()>);
}

/// Worker存活监控
///
/// 只观察和告警，从不终止或重启被监控的Worker。
pub struct LivenessMonitor {
    config: MonitorConfig,
    store: RecordStore,
    channels: Vec<NotificationChannel>,
    clock: Arc<dyn Clock>,
    alert_gate: Mutex<AlertGate>,
}

impl LivenessMonitor {
    pub fn new(
        config: MonitorConfig,
        store: RecordStore,
        channels: Vec<NotificationChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let alert_gate = Mutex::new(AlertGate::new(config.alert_cooldown_ms));
        Self {
            config,
            store,
            channels,
            clock,
            alert_gate,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// 最近一次成功分发告警的时间
    pub async fn last_alert_ms(&self) -> Option<i64> {
        self.alert_gate.lock().await.last_alert_ms()
    }

    async fn load_lock(&self) -> Option<LockRecord> {
        match self.store.read_lock().await {
            RecordRead::Present(lock) => Some(lock),
            RecordRead::Missing => {
                debug!("锁文件不存在: {}", self.store.lock_path().display());
                None
            }
            RecordRead::Corrupt(reason) => {
                warn!(
                    "锁文件无法解析，按缺失处理: {} ({})",
                    self.store.lock_path().display(),
                    reason
                );
                None
            }
        }
    }

    async fn load_heartbeat(&self) -> Option<HeartbeatRecord> {
        match self.store.read_heartbeat().await {
            RecordRead::Present(heartbeat) => Some(heartbeat),
            RecordRead::Missing => {
                debug!("心跳文件不存在: {}", self.store.heartbeat_path().display());
                None
            }
            RecordRead::Corrupt(reason) => {
                warn!(
                    "心跳文件无法解析，按缺失处理: {} ({})",
                    self.store.heartbeat_path().display(),
                    reason
                );
                None
            }
        }
    }

    fn log_status(&self, health: &WorkerHealth) {
        match health {
            WorkerHealth::Healthy {
                pid,
                heartbeat_pid,
                elapsed_ms,
            } => {
                info!(
                    pid = *pid,
                    elapsed_secs = round_secs(*elapsed_ms),
                    "{}",
                    health.status_line()
                );
                if *elapsed_ms < 0 {
                    warn!(
                        "心跳时间晚于当前时间 {}ms，可能存在时钟偏差",
                        -elapsed_ms
                    );
                }
                if pid != heartbeat_pid {
                    warn!(
                        "锁PID与心跳PID不一致: lock_pid={}, heartbeat_pid={}",
                        pid, heartbeat_pid
                    );
                }
            }
            WorkerHealth::Stale {
                pid, elapsed_ms, ..
            } => {
                warn!(
                    state = %health.state(),
                    pid = *pid,
                    elapsed_secs = round_secs(*elapsed_ms),
                    "{}",
                    health.status_line()
                );
            }
            WorkerHealth::DownNoHeartbeat { lock_pid } => {
                warn!(
                    state = %health.state(),
                    lock_pid = *lock_pid,
                    "{}",
                    health.status_line()
                );
            }
            WorkerHealth::DownNoLock => {
                warn!(state = %health.state(), "{}", health.status_line());
            }
        }
    }

    /// 锁持有者进程已不存在时记录诊断日志
    fn check_orphaned_lock(&self, health: &WorkerHealth) -> bool {
        let Some(pid) = health.lock_pid() else {
            return false;
        };
        if is_process_alive(pid) {
            return false;
        }
        warn!(
            lock_pid = pid,
            "Lock exists (PID {}) but process dead - orphaned lock", pid
        );
        true
    }

    /// 单个检测周期，错误与panic都在这里截住，调度循环不受影响
    async fn run_cycle(&self) {
        match AssertUnwindSafe(self.check_health()).catch_unwind().await {
            Ok(check) => {
                debug!(state = %check.health.state(), "检测周期完成");
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("健康检测周期异常终止，将在下个周期继续: {}", reason);
            }
        }
    }
}

#[async_trait]
impl LivenessMonitorService for LivenessMonitor {
    async fn check_health(&self) -> HealthCheck {
        let now = self.clock.now_ms();

        // 锁缺失时直接判定宕机，不再读取心跳
        let lock = self.load_lock().await;
        let heartbeat = match lock {
            Some(_) => self.load_heartbeat().await,
            None => None,
        };

        let health = classify(
            lock.as_ref(),
            heartbeat.as_ref(),
            now,
            self.config.stale_threshold_ms,
        );
        self.log_status(&health);
        let orphaned_lock = self.check_orphaned_lock(&health);

        let alert = match health.alert_message() {
            Some(message) => Some(self.send_alert(&message).await),
            None => None,
        };

        HealthCheck {
            health,
            alert,
            orphaned_lock,
        }
    }

    async fn send_alert(&self, message: &str) -> AlertOutcome {
        let now = self.clock.now_ms();
        let mut gate = self.alert_gate.lock().await;

        if let Some(remaining_ms) = gate.cooldown_remaining(now) {
            info!(remaining_ms, "Alert cooldown active, skipping");
            return AlertOutcome::Suppressed { remaining_ms };
        }

        let timeout = Duration::from_millis(self.config.notify_timeout_ms);
        let report = dispatch_all(&self.channels, message, timeout).await;

        if report.all_failed() {
            error!(
                failed = report.failed.len(),
                "Failed to send alert: 所有通知渠道均失败，下个周期重试"
            );
            return AlertOutcome::Failed(report);
        }

        if self.channels.is_empty() {
            warn!(message = %message, "未配置通知渠道，告警仅写入日志");
        }

        gate.record_dispatch(now);
        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Alert sent: {}",
            message
        );
        AlertOutcome::Sent(report)
    }

    async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            stale_threshold_ms = self.config.stale_threshold_ms,
            check_interval_ms = self.config.check_interval_ms,
            alert_cooldown_ms = self.config.alert_cooldown_ms,
            channels = ?self.channel_names(),
            "Task Worker Health Monitor starting..."
        );

        let mut ticker = interval(Duration::from_millis(self.config.check_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // 第一次tick立即完成，即启动时的首次检测
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown_rx.recv() => {
                    info!("收到停止信号，退出Worker存活监控循环");
                    break;
                }
            }
        }
    }
}
