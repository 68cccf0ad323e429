pub mod health;
pub mod worker;

pub use health::{round_secs, HealthState, WorkerHealth, NO_HEARTBEAT_ALERT, NO_LOCK_ALERT};
pub use worker::{HeartbeatRecord, LockRecord};
