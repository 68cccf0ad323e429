pub mod clock;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod process;
pub mod records;

pub use clock::{Clock, SystemClock};
pub use config::{
    LogFormat, LoggingConfig, MonitorConfig, NotifierConfig, RecordsConfig, WatchdogConfig,
    WorkerConfig,
};
pub use errors::{WatchdogError, WatchdogResult};
pub use logging::init_logging;
pub use models::{
    HealthState, HeartbeatRecord, LockRecord, WorkerHealth, NO_HEARTBEAT_ALERT, NO_LOCK_ALERT,
};
pub use process::is_process_alive;
pub use records::{RecordRead, RecordStore};
