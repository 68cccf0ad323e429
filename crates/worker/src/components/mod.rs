pub mod heartbeat_writer;
pub mod worker_lock;

pub use heartbeat_writer::HeartbeatWriter;
pub use worker_lock::{LockOptions, WorkerLock};
