use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, Command};
use tracing::info;

use watchdog_core::{SystemClock, WatchdogError};
use worker_watchdog::app::WorkerApp;
use worker_watchdog::common::{bootstrap, join_with_timeout, wait_for_shutdown_signal, StartupConfig};
use worker_watchdog::shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("heartbeat-worker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("任务Worker锁与心跳")
        .long_about("获取Worker独占锁并周期写入心跳文件，供 worker-watchdog 监控")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时查找默认位置"),
        )
        .arg(
            Arg::new("worker-id")
                .short('w')
                .long("worker-id")
                .value_name("ID")
                .help("Worker唯一标识符，默认由主机名、PID和启动时间生成"),
        )
        .arg(
            Arg::new("beat-interval-ms")
                .long("beat-interval-ms")
                .value_name("MS")
                .help("心跳写入间隔（毫秒）")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty", "text"]),
        )
        .get_matches();

    let startup = StartupConfig {
        config_path: matches.get_one::<String>("config").cloned(),
        log_level: matches.get_one::<String>("log-level").cloned(),
        log_format: matches.get_one::<String>("log-format").cloned(),
    };
    let mut config = bootstrap(&startup)?;
    if let Some(interval) = matches.get_one::<u64>("beat-interval-ms") {
        config.worker.beat_interval_ms = *interval;
    }

    let pid = std::process::id();
    let worker_id = matches
        .get_one::<String>("worker-id")
        .cloned()
        .unwrap_or_else(|| default_worker_id(pid));

    let app = match WorkerApp::start(&config, &worker_id, pid, Arc::new(SystemClock)).await {
        Ok(app) => app,
        Err(WatchdogError::LockHeld { pid: holder, .. }) => {
            info!("另一个Worker正在运行 (PID {})，退出", holder);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(worker_id = %worker_id, pid, "Task Worker starting...");

    let shutdown_manager = ShutdownManager::new();
    let handle = app.spawn_heartbeat(shutdown_manager.subscribe().await);

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;
    join_with_timeout(handle, "心跳任务").await;

    app.stop().await?;
    info!("Task Worker stopped");
    Ok(())
}

fn default_worker_id(pid: u32) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "worker-{}-{}-{}",
        host,
        pid,
        chrono::Utc::now().timestamp_millis()
    )
}
