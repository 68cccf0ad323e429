pub mod alert_gate;
pub mod classifier;
pub mod liveness_monitor;

pub use alert_gate::AlertGate;
pub use classifier::classify;
pub use liveness_monitor::{AlertOutcome, HealthCheck, LivenessMonitor, LivenessMonitorService};
