use std::path::Path;

use tempfile::TempDir;
use watchdog_core::{HeartbeatRecord, LockRecord, RecordStore};

/// 临时目录中的一对心跳/锁文件，随对象销毁
pub struct TestRecords {
    dir: TempDir,
    store: RecordStore,
}

impl TestRecords {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store = RecordStore::new(
            dir.path().join("task-worker.heartbeat"),
            dir.path().join("task-worker.lock"),
        );
        Self { dir, store }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> RecordStore {
        self.store.clone()
    }

    pub fn write_lock(&self, lock: &LockRecord) {
        let body = serde_json::to_string(lock).expect("serialize lock");
        std::fs::write(self.store.lock_path(), body).expect("write lock");
    }

    pub fn write_heartbeat(&self, heartbeat: &HeartbeatRecord) {
        let body = serde_json::to_string(heartbeat).expect("serialize heartbeat");
        std::fs::write(self.store.heartbeat_path(), body).expect("write heartbeat");
    }

    pub fn write_raw_lock(&self, content: &str) {
        std::fs::write(self.store.lock_path(), content).expect("write lock");
    }

    pub fn write_raw_heartbeat(&self, content: &str) {
        std::fs::write(self.store.heartbeat_path(), content).expect("write heartbeat");
    }

    pub fn remove_lock(&self) {
        let _ = std::fs::remove_file(self.store.lock_path());
    }

    pub fn remove_heartbeat(&self) {
        let _ = std::fs::remove_file(self.store.heartbeat_path());
    }

    pub fn lock_exists(&self) -> bool {
        self.store.lock_path().exists()
    }

    pub fn heartbeat_exists(&self) -> bool {
        self.store.heartbeat_path().exists()
    }
}

impl Default for TestRecords {
    fn default() -> Self {
        Self::new()
    }
}

/// 一个已经退出并被回收的子进程PID，用作"进程已不存在"的锁持有者
#[cfg(unix)]
pub fn exited_pid() -> u32 {
    let mut child = std::process::Command::new("true")
        .spawn()
        .expect("spawn true");
    let pid = child.id();
    child.wait().expect("wait child");
    pid
}
