//! 进程存活探测

/// 用信号0探测进程是否存在
///
/// 进程存在但属于其他用户（EPERM）也算存活。PID为0、超出 `pid_t` 范围，
/// 或平台不支持探测时无法判定，一律按存活处理，调用方不会据此清理锁。
#[cfg(unix)]
pub fn is_process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return true;
    };
    if raw == 0 {
        return true;
    }

    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(not(unix))]
pub fn is_process_alive(_pid: u32) -> bool {
    true
}
