use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use watchdog_core::{WatchdogError, WatchdogResult};

use crate::Notifier;

/// 通过外部聊天桥接命令（如 `clawdbot message send ...`）发送告警
///
/// 参数逐个传给子进程，不经过shell，消息中的引号无需转义。
/// 参数模板中的 `{target}` 与 `{message}` 在发送时替换。
pub struct CommandNotifier {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, program: P, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
        }
    }

    fn render_args(&self, target: &str, message: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| render_template(arg, target, message))
            .collect()
    }
}

/// 单遍替换占位符，替换进来的内容不会被再次展开
fn render_template(template: &str, target: &str, message: &str) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{target}") {
            rendered.push_str(target);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{message}") {
            rendered.push_str(message);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);
    rendered
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn send(&self, target: &str, message: &str) -> WatchdogResult<()> {
        let args = self.render_args(target, message);
        debug!(
            "执行通知命令: channel={}, program={}, args={:?}",
            self.name, self.program, args
        );

        // 超时由调用方控制，future被丢弃时子进程随之被杀掉
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                WatchdogError::notification(&self.name, format!("启动命令失败: {e}"))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(WatchdogError::notification(
            &self.name,
            format!(
                "命令执行失败，退出码: {:?}, stderr: {}",
                output.status.code(),
                stderr.trim()
            ),
        ))
    }
}
