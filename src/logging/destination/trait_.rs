use crate::logging::Severity;
use crate::time::Time;

/// 日志目标类型
///
/// 每个模块在每个级别下对每种类型最多绑定一个目标。
/// `Syslog` 和 `Socket` 目前只是预留的扩展点，没有内置实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    File = 0,
    Stderr = 1,
    Syslog = 2,
    Socket = 3,
}

impl DestinationKind {
    pub const COUNT: usize = 4;

    pub const ALL: [DestinationKind; DestinationKind::COUNT] = [
        DestinationKind::File,
        DestinationKind::Stderr,
        DestinationKind::Syslog,
        DestinationKind::Socket,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 日志目标 trait
///
/// 负责把格式化好的日志字节写到目标介质。
/// 任何失败都在内部消化（丢弃这条记录），不向调用方返回错误
pub trait LogDestination: Send + Sync {
    fn kind(&self) -> DestinationKind;

    /// 写入一条以换行结尾的完整记录
    fn write(&self, force_flush: bool, severity: Severity, timestamp: Time, message: &[u8]);

    /// 刷新缓冲区
    fn flush(&self);

    /// 累计写入的字节数
    fn log_size(&self) -> u64;
}
