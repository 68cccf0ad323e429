//! 心跳文件与锁文件的读写
//!
//! 两份记录都是磁盘上的 JSON 对象，由外部Worker写入。监控端只读取，
//! 读不到或解析失败一律视为记录缺失，由上层归类为Worker宕机。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::RecordsConfig;
use crate::models::{HeartbeatRecord, LockRecord};
use crate::{WatchdogError, WatchdogResult};

/// 读取记录的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRead<T> {
    Present(T),
    Missing,
    /// 文件存在但无法读取或不是合法记录
    Corrupt(String),
}

impl<T> RecordRead<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            RecordRead::Present(record) => Some(record),
            RecordRead::Missing | RecordRead::Corrupt(_) => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, RecordRead::Present(_))
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    heartbeat_path: PathBuf,
    lock_path: PathBuf,
}

impl RecordStore {
    pub fn new<H: Into<PathBuf>, L: Into<PathBuf>>(heartbeat_path: H, lock_path: L) -> Self {
        Self {
            heartbeat_path: heartbeat_path.into(),
            lock_path: lock_path.into(),
        }
    }

    pub fn from_config(config: &RecordsConfig) -> Self {
        Self::new(&config.heartbeat_path, &config.lock_path)
    }

    pub fn heartbeat_path(&self) -> &Path {
        &self.heartbeat_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub async fn read_heartbeat(&self) -> RecordRead<HeartbeatRecord> {
        read_json(&self.heartbeat_path).await
    }

    pub async fn read_lock(&self) -> RecordRead<LockRecord> {
        read_json(&self.lock_path).await
    }

    /// 覆盖写入心跳：先写临时文件再原子重命名，读取方不会看到半截内容
    pub async fn write_heartbeat(&self, record: &HeartbeatRecord) -> WatchdogResult<()> {
        write_json_atomic(&self.heartbeat_path, record).await
    }

    /// 独占创建锁文件，文件已存在时返回 `LockHeld`
    pub async fn create_lock(&self, record: &LockRecord) -> WatchdogResult<()> {
        let open_result = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await;

        let mut file = match open_result {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let (pid, worker_id) = match self.read_lock().await {
                    RecordRead::Present(holder) => (holder.pid, holder.worker_id),
                    _ => (0, String::new()),
                };
                return Err(WatchdogError::lock_held(pid, worker_id));
            }
            Err(e) => return Err(e.into()),
        };

        let body = serde_json::to_vec(record)?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        Ok(())
    }

    pub async fn remove_lock(&self) -> WatchdogResult<()> {
        remove_if_exists(&self.lock_path).await
    }

    pub async fn remove_heartbeat(&self) -> WatchdogResult<()> {
        remove_if_exists(&self.heartbeat_path).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> RecordRead<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("记录文件不存在: {}", path.display());
            return RecordRead::Missing;
        }
        Err(e) => return RecordRead::Corrupt(format!("读取失败: {e}")),
    };

    match serde_json::from_str(&content) {
        Ok(record) => RecordRead::Present(record),
        Err(e) => RecordRead::Corrupt(format!("解析失败: {e}")),
    }
}

async fn write_json_atomic<T: Serialize>(path: &Path, record: &T) -> WatchdogResult<()> {
    let body = serde_json::to_vec(record)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| WatchdogError::Internal(format!("无效的记录路径: {}", path.display())))?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(format!(".tmp-{}", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, &body).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> WatchdogResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
