use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;

use watchdog_core::{HealthState, NotifierConfig, WatchdogConfig, WatchdogError, NO_LOCK_ALERT};
use watchdog_monitor::AlertOutcome;
use watchdog_testing_utils::{ManualClock, TestRecords};
use worker_watchdog::app::{MonitorApp, WorkerApp};

const NOW: i64 = 1_700_000_000_000;

fn config_for(records: &TestRecords) -> WatchdogConfig {
    let mut config = WatchdogConfig::default();
    config.records.heartbeat_path = records.store().heartbeat_path().to_path_buf();
    config.records.lock_path = records.store().lock_path().to_path_buf();
    config.notifiers = vec![NotifierConfig::Log {
        name: "log".to_string(),
        target: String::new(),
    }];
    config
}

/// 把告警逐行追加到文件的命令渠道
#[cfg(unix)]
fn file_notifier(out: &Path) -> NotifierConfig {
    NotifierConfig::Command {
        name: "file".to_string(),
        target: "ops".to_string(),
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            format!("printf '%s|%s\\n' \"$1\" \"$2\" >> '{}'", out.display()),
            "sh".to_string(),
            "{target}".to_string(),
            "{message}".to_string(),
        ],
    }
}

#[tokio::test]
async fn test_running_worker_is_healthy() -> Result<()> {
    let records = TestRecords::new();
    let config = config_for(&records);
    let clock = ManualClock::new(NOW);

    let worker = WorkerApp::start(&config, "worker-a", 4242, clock.clone()).await?;
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let _heartbeat = worker.spawn_heartbeat(shutdown_rx);
    wait_for_file(records.store().heartbeat_path()).await;

    clock.advance(30_000);
    let monitor = MonitorApp::with_clock(&config, clock.clone())?;
    let check = monitor.check_once().await;

    assert_eq!(check.health.state(), HealthState::Healthy);
    assert!(check.alert.is_none());
    Ok(())
}

#[tokio::test]
async fn test_hung_worker_is_reported_stale() -> Result<()> {
    let records = TestRecords::new();
    let config = config_for(&records);
    let clock = ManualClock::new(NOW);

    let worker = WorkerApp::start(&config, "worker-a", 4242, clock.clone()).await?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let heartbeat = worker.spawn_heartbeat(shutdown_rx);
    wait_for_file(records.store().heartbeat_path()).await;

    // 心跳停止，锁仍然存在
    shutdown_tx.send(())?;
    heartbeat.await?;
    clock.advance(150_000);

    let monitor = MonitorApp::with_clock(&config, clock.clone())?;
    let check = monitor.check_once().await;

    assert_eq!(check.health.state(), HealthState::Stale);
    assert_eq!(
        check.health.alert_message().as_deref(),
        Some("🚨 Task Worker STALE - No heartbeat for 150s\nPID: 4242")
    );
    match check.alert {
        Some(AlertOutcome::Sent(report)) => assert_eq!(report.delivered, vec!["log"]),
        other => panic!("unexpected alert outcome: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_stopped_worker_is_reported_down() -> Result<()> {
    let records = TestRecords::new();
    let config = config_for(&records);
    let clock = ManualClock::new(NOW);

    let worker = WorkerApp::start(&config, "worker-a", 4242, clock.clone()).await?;
    worker.stop().await?;

    let monitor = MonitorApp::with_clock(&config, clock.clone())?;
    let check = monitor.check_once().await;

    assert_eq!(check.health.state(), HealthState::DownNoLock);
    assert_eq!(check.health.alert_message().as_deref(), Some(NO_LOCK_ALERT));
    assert!(!records.heartbeat_exists());
    Ok(())
}

#[tokio::test]
async fn test_second_worker_cannot_take_live_lock() -> Result<()> {
    let records = TestRecords::new();
    let mut config = config_for(&records);
    config.worker.lock_retry_delay_ms = 1;
    let clock = ManualClock::new(NOW);

    // 第一个Worker以测试进程自身的PID持有锁，保证持有者存活
    let holder = std::process::id();
    let first = WorkerApp::start(&config, "worker-a", holder, clock.clone()).await?;
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let _heartbeat = first.spawn_heartbeat(shutdown_rx);
    wait_for_file(records.store().heartbeat_path()).await;

    let second = WorkerApp::start(&config, "worker-b", 5555, clock.clone()).await;
    assert!(matches!(
        second,
        Err(WatchdogError::LockHeld { pid, .. }) if pid == holder
    ));
    assert_eq!(first.lock().pid(), holder);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_channel_receives_alert_once_per_cooldown() -> Result<()> {
    let records = TestRecords::new();
    let out = records.dir().join("alerts.txt");
    let mut config = config_for(&records);
    config.notifiers = vec![file_notifier(&out)];
    let clock = ManualClock::new(NOW);
    let monitor = MonitorApp::with_clock(&config, clock.clone())?;

    for _ in 0..3 {
        monitor.check_once().await;
        clock.advance(60_000);
    }

    let content = std::fs::read_to_string(&out)?;
    assert_eq!(content, format!("ops|{NO_LOCK_ALERT}\n"));
    Ok(())
}

#[tokio::test]
async fn test_monitor_loop_stops_on_shutdown() -> Result<()> {
    let records = TestRecords::new();
    let mut config = config_for(&records);
    config.monitor.check_interval_ms = 10;
    let monitor = MonitorApp::with_clock(&config, ManualClock::new(NOW))?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = monitor.spawn(shutdown_rx);

    tokio::time::timeout(Duration::from_secs(5), async {
        while monitor.monitor().last_alert_ms().await.is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    shutdown_tx.send(())?;
    tokio::time::timeout(Duration::from_secs(5), handle).await??;
    Ok(())
}

#[test]
fn test_bundled_config_is_valid() -> Result<()> {
    let config = WatchdogConfig::from_toml(&std::fs::read_to_string("config/watchdog.toml")?)?;

    assert_eq!(config.monitor.stale_threshold_ms, 120_000);
    assert_eq!(config.monitor.alert_cooldown_ms, 300_000);
    let names: Vec<_> = config.notifiers.iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["slack", "telegram"]);
    assert_eq!(config.notifiers[0].target(), "U0ABTP704QK");
    Ok(())
}

async fn wait_for_file(path: &Path) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("file not created in time");
}
