use std::io::Write;

use config::Map;
use tempfile::NamedTempFile;

use super::*;
use crate::WatchdogError;

const FULL_TOML: &str = r##"
[monitor]
stale_threshold_ms = 90000
check_interval_ms = 30000
alert_cooldown_ms = 600000
notify_timeout_ms = 5000

[records]
heartbeat_path = "/var/run/task-worker.heartbeat"
lock_path = "/var/run/task-worker.lock"

[logging]
level = "debug"
format = "json"

[[notifiers]]
kind = "command"
name = "slack"
target = "U0ABTP704QK"
program = "clawdbot"
args = ["message", "send", "--channel", "slack", "--target", "{target}", "--message", "{message}", "--json"]

[[notifiers]]
kind = "webhook"
name = "alerts-webhook"
target = "#alerts"
url = "https://hooks.slack.com/services/T000/B000/XXXX"

[[notifiers]]
kind = "log"
name = "console"
"##;

#[test]
fn test_default_config() {
    let config = WatchdogConfig::default();
    assert_eq!(config.monitor.stale_threshold_ms, 120_000);
    assert_eq!(config.monitor.check_interval_ms, 60_000);
    assert_eq!(config.monitor.alert_cooldown_ms, 300_000);
    assert_eq!(config.monitor.notify_timeout_ms, 10_000);
    assert!(config
        .records
        .heartbeat_path
        .ends_with("task-worker.heartbeat"));
    assert!(config.records.lock_path.ends_with("task-worker.lock"));
    assert_eq!(config.worker.lock_max_retries, 3);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.notifiers.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml() {
    let config = WatchdogConfig::from_toml(FULL_TOML).unwrap();

    assert_eq!(config.monitor.stale_threshold_ms, 90_000);
    assert_eq!(config.monitor.notify_timeout_ms, 5_000);
    assert_eq!(
        config.records.lock_path,
        std::path::PathBuf::from("/var/run/task-worker.lock")
    );
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);

    assert_eq!(config.notifiers.len(), 3);
    assert_eq!(config.notifiers[0].name(), "slack");
    assert_eq!(config.notifiers[0].target(), "U0ABTP704QK");
    assert!(matches!(
        &config.notifiers[0],
        NotifierConfig::Command { program, args, .. }
            if program == "clawdbot" && args.len() == 9
    ));
    assert!(matches!(
        &config.notifiers[1],
        NotifierConfig::Webhook { username: None, .. }
    ));
    assert_eq!(config.notifiers[2].target(), "");
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = WatchdogConfig::from_toml("[monitor]\nstale_threshold_ms = 1000\n").unwrap();
    assert_eq!(config.monitor.stale_threshold_ms, 1000);
    assert_eq!(config.monitor.check_interval_ms, 60_000);
    assert_eq!(config.worker.beat_interval_ms, 60_000);
}

#[test]
fn test_toml_round_trip() {
    let config = WatchdogConfig::from_toml(FULL_TOML).unwrap();
    let rendered = config.to_toml().unwrap();
    let reparsed = WatchdogConfig::from_toml(&rendered).unwrap();

    assert_eq!(reparsed.monitor, config.monitor);
    assert_eq!(reparsed.records, config.records);
    assert_eq!(reparsed.notifiers, config.notifiers);
}

#[test]
fn test_validation_rejects_zero_values() {
    let mut config = WatchdogConfig::default();
    config.monitor.check_interval_ms = 0;
    assert!(matches!(
        config.validate(),
        Err(WatchdogError::Configuration(_))
    ));

    let mut config = WatchdogConfig::default();
    config.monitor.stale_threshold_ms = 0;
    assert!(config.validate().is_err());

    let mut config = WatchdogConfig::default();
    config.worker.lock_max_retries = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_out_of_range_durations() {
    let mut config = WatchdogConfig::default();
    config.monitor.alert_cooldown_ms = u64::MAX;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("alert_cooldown_ms"));

    let mut config = WatchdogConfig::default();
    config.monitor.stale_threshold_ms = i64::MAX as u64 + 1;
    assert!(config.validate().is_err());

    let mut config = WatchdogConfig::default();
    config.monitor.alert_cooldown_ms = i64::MAX as u64;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_notifiers() {
    let bad_url = r#"
[[notifiers]]
kind = "webhook"
name = "hook"
url = "ftp://example.com"
"#;
    assert!(WatchdogConfig::from_toml(bad_url).is_err());

    let empty_program = r#"
[[notifiers]]
kind = "command"
name = "slack"
target = "U1"
program = " "
"#;
    assert!(WatchdogConfig::from_toml(empty_program).is_err());

    let duplicate = r#"
[[notifiers]]
kind = "log"
name = "console"

[[notifiers]]
kind = "log"
name = "console"
"#;
    let err = WatchdogConfig::from_toml(duplicate).unwrap_err();
    assert!(err.to_string().contains("console"));
}

#[test]
fn test_unknown_notifier_kind_is_rejected() {
    let toml = r#"
[[notifiers]]
kind = "carrier_pigeon"
name = "bird"
"#;
    assert!(WatchdogConfig::from_toml(toml).is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FULL_TOML.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let config = WatchdogConfig::load_with_env(Some(&path), Some(Map::new())).unwrap();
    assert_eq!(config.monitor.stale_threshold_ms, 90_000);
    assert_eq!(config.notifiers.len(), 3);
}

#[test]
fn test_load_missing_file_fails() {
    let result = WatchdogConfig::load_with_env(Some("/nonexistent/watchdog.toml"), None);
    assert!(matches!(result, Err(WatchdogError::Configuration(_))));
}

#[test]
fn test_environment_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FULL_TOML.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut env = Map::new();
    env.insert(
        "WATCHDOG_MONITOR__STALE_THRESHOLD_MS".to_string(),
        "45000".to_string(),
    );
    env.insert("WATCHDOG_LOGGING__LEVEL".to_string(), "warn".to_string());

    let config = WatchdogConfig::load_with_env(Some(&path), Some(env)).unwrap();
    assert_eq!(config.monitor.stale_threshold_ms, 45_000);
    assert_eq!(config.monitor.check_interval_ms, 30_000);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_log_format_from_str() {
    assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert!("xml".parse::<LogFormat>().is_err());
}
