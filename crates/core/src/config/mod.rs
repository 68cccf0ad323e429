mod loader;
mod models;

pub use models::{
    LogFormat, LoggingConfig, MonitorConfig, NotifierConfig, RecordsConfig, WatchdogConfig,
    WorkerConfig,
};

#[cfg(test)]
mod tests;
