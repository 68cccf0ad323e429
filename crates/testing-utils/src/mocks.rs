use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use watchdog_core::{Clock, WatchdogError, WatchdogResult};
use watchdog_notifier::{NotificationChannel, Notifier};

/// 手动控制的时钟
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now_ms: AtomicI64::new(now_ms),
        })
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub target: String,
    pub message: String,
}

/// 记录所有发送内容的通知渠道
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()> {
        self.sent.lock().unwrap().push(SentMessage {
            target: target.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// 总是失败的通知渠道
#[derive(Debug, Default)]
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _target: &str, _message: &str) -> WatchdogResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(WatchdogError::notification("failing", "connection refused"))
    }
}

/// 前 `failures` 次失败，之后成功
#[derive(Debug)]
pub struct FlakyNotifier {
    failures: usize,
    attempts: AtomicUsize,
    delivered: RecordingNotifier,
}

impl FlakyNotifier {
    pub fn failing_times(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            attempts: AtomicUsize::new(0),
            delivered: RecordingNotifier::default(),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<SentMessage> {
        self.delivered.messages()
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(WatchdogError::notification("flaky", "temporary failure"));
        }
        self.delivered.send(target, message).await
    }
}

/// 等待 `delay` 之后才成功
#[derive(Debug)]
pub struct SlowNotifier {
    delay: Duration,
}

impl SlowNotifier {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

#[async_trait]
impl Notifier for SlowNotifier {
    async fn send(&self, _target: &str, _message: &str) -> WatchdogResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// 发送时直接panic
#[derive(Debug, Default)]
pub struct PanickingNotifier {
    attempts: AtomicUsize,
}

impl PanickingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send(&self, _target: &str, _message: &str) -> WatchdogResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        panic!("notifier exploded");
    }
}

/// 用给定名称和目标包装一个通知渠道
pub fn channel<N: Notifier + 'static>(name: &str, target: &str, notifier: Arc<N>) -> NotificationChannel {
    NotificationChannel::new(name, target, notifier)
}
