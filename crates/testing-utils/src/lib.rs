//! # Watchdog Testing Utils
//!
//! 工作区内共享的测试替身与测试辅助工具：
//!
//! - **ManualClock**: 手动推进的时钟，冷却期与心跳过期无需真实等待
//! - **Notifiers**: 记录型、失败型、慢速型、抖动型、panic型通知渠道
//! - **TestRecords**: 临时目录中的心跳/锁文件
//!
//! ```toml
//! [dev-dependencies]
//! watchdog-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
