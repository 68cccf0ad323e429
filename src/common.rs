use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use watchdog_core::{init_logging, LogFormat, WatchdogConfig};

/// 关闭时等待后台任务退出的最长时间
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// 命令行提供的启动参数，覆盖配置文件中的同名项
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub config_path: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// 加载配置并应用命令行覆盖
pub fn load_config(startup_config: &StartupConfig) -> Result<WatchdogConfig> {
    let mut config = WatchdogConfig::load(startup_config.config_path.as_deref())
        .with_context(|| match &startup_config.config_path {
            Some(path) => format!("加载配置文件失败: {path}"),
            None => "加载默认配置失败".to_string(),
        })?;

    if let Some(level) = &startup_config.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &startup_config.log_format {
        config.logging.format = format
            .parse::<LogFormat>()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    Ok(config)
}

/// 加载配置并初始化日志系统
pub fn bootstrap(startup_config: &StartupConfig) -> Result<WatchdogConfig> {
    let config = load_config(startup_config)?;
    init_logging(&config.logging).context("初始化日志系统失败")?;

    match &startup_config.config_path {
        Some(path) => info!("配置文件: {}", path),
        None => info!("未指定配置文件，使用默认位置或内置默认值"),
    }
    Ok(config)
}

/// 等待后台任务在超时内退出
pub async fn join_with_timeout<T>(handle: JoinHandle<T>, service_name: &str) -> Option<T> {
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
        Ok(Ok(value)) => {
            info!("{} 已优雅关闭", service_name);
            Some(value)
        }
        Ok(Err(e)) => {
            error!("{} 关闭时发生错误: {e}", service_name);
            None
        }
        Err(_) => {
            warn!("{} 关闭超时，强制退出", service_name);
            None
        }
    }
}

/// 等待关闭信号（Ctrl+C 或 SIGTERM）
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
