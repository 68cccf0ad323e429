use std::process::ExitCode;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing::{info, warn};

use worker_watchdog::app::MonitorApp;
use worker_watchdog::common::{bootstrap, join_with_timeout, wait_for_shutdown_signal, StartupConfig};
use worker_watchdog::shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = Command::new("worker-watchdog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("任务Worker存活监控")
        .long_about("周期读取Worker的锁文件与心跳文件，发现Worker宕机或失去响应时发送告警")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时查找默认位置"),
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
        .arg(
            Arg::new("once")
                .long("once")
                .help("只检测一次，Worker不健康时以非零状态退出")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let startup = StartupConfig {
        config_path: matches.get_one::<String>("config").cloned(),
        log_level: matches.get_one::<String>("log-level").cloned(),
        log_format: matches.get_one::<String>("log-format").cloned(),
    };
    let config = bootstrap(&startup)?;
    let app = MonitorApp::new(&config)?;

    if matches.get_flag("once") {
        let check = app.check_once().await;
        return Ok(if check.health.is_healthy() {
            ExitCode::SUCCESS
        } else {
            warn!(state = %check.health.state(), "Worker不健康");
            ExitCode::FAILURE
        });
    }

    let shutdown_manager = ShutdownManager::new();
    let handle = app.spawn(shutdown_manager.subscribe().await);

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;
    join_with_timeout(handle, "Worker存活监控").await;

    info!("Worker存活监控已退出");
    Ok(ExitCode::SUCCESS)
}
