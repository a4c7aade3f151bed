use once_cell::sync::OnceCell;

#[derive(Debug)]
struct ProgramInfo {
    short_name: String,
    pid: u32,
}

static PROGRAM_INFO: OnceCell<ProgramInfo> = OnceCell::new();

/// 记录程序短名（`argv0` 最后一个 `/` 之后的部分）和进程号
///
/// 只有第一次调用生效
pub fn init_logging_utilities(argv0: &str) {
    let short_name = argv0.rsplit('/').next().unwrap_or(argv0).to_string();
    let _ = PROGRAM_INFO.set(ProgramInfo {
        short_name,
        pid: std::process::id(),
    });
}

/// 程序短名，未初始化时为 `None`
pub fn program_short_name() -> Option<&'static str> {
    PROGRAM_INFO.get().map(|info| info.short_name.as_str())
}

/// 初始化时记录的进程号
pub fn program_pid() -> Option<u32> {
    PROGRAM_INFO.get().map(|info| info.pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_utilities() {
        init_logging_utilities("/usr/local/bin/server");
        init_logging_utilities("/usr/bin/other");
        assert_eq!(program_short_name(), Some("server"));
        assert_eq!(program_pid(), Some(std::process::id()));
    }
}
