//! 被监控Worker一侧的组件：独占锁与心跳写入

pub mod components;

pub use components::{HeartbeatWriter, LockOptions, WorkerLock};
