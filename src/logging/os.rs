// errno 的保存与恢复、线程号、磁盘满判断

use std::io;

thread_local! {
    static THREAD_ID: u64 = current_thread_id();
}

/// 当前线程的数字标识，Linux 上为内核线程号
pub(crate) fn thread_id() -> u64 {
    // 线程退出阶段 TLS 可能已销毁
    THREAD_ID
        .try_with(|tid| *tid)
        .unwrap_or_else(|_| current_thread_id())
}

#[cfg(target_os = "linux")]
fn current_thread_id() -> u64 {
    // SAFETY: gettid 没有参数，总是成功
    unsafe { libc::syscall(libc::SYS_gettid) as u64 }
}

#[cfg(not(target_os = "linux"))]
fn current_thread_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

/// 读取当前线程的 errno
pub(crate) fn errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// 设置当前线程的 errno
#[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
pub(crate) fn set_errno(value: i32) {
    // SAFETY: __errno_location 返回当前线程 errno 的有效地址
    unsafe {
        *libc::__errno_location() = value;
    }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
pub(crate) fn set_errno(value: i32) {
    // SAFETY: __error 返回当前线程 errno 的有效地址
    unsafe {
        *libc::__error() = value;
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "emscripten",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
pub(crate) fn set_errno(_value: i32) {}

/// 写入失败是否因为磁盘空间不足
pub(crate) fn is_disk_full(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::ENOSPC)
    }
    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}
