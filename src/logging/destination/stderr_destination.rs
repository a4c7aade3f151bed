use serde::Deserialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::destination::{DestinationKind, LogDestination};
use crate::logging::Severity;
use crate::time::Time;

/// StderrDestination 配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StderrDestinationConfig {}

/// 标准错误输出目标
///
/// 每条记录写完立即刷新
#[derive(Debug, Default)]
pub struct StderrDestination {
    bytes_written: AtomicU64,
}

impl StderrDestination {
    pub fn new(_config: StderrDestinationConfig) -> Self {
        Self::default()
    }
}

impl LogDestination for StderrDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Stderr
    }

    fn write(&self, _force_flush: bool, _severity: Severity, _timestamp: Time, message: &[u8]) {
        let mut stderr = io::stderr().lock();
        if stderr.write_all(message).and_then(|_| stderr.flush()).is_ok() {
            self.bytes_written
                .fetch_add(message.len() as u64, Ordering::Relaxed);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }

    fn log_size(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

crate::impl_from!(StderrDestinationConfig => StderrDestination);
crate::impl_box_from!(StderrDestination => dyn LogDestination);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_destination_write() {
        let dst = StderrDestination::default();
        dst.write(false, Severity::Warning, Time::now(), b"stderr destination test\n");
        dst.flush();
        assert_eq!(dst.log_size(), 24);
        assert_eq!(dst.kind(), DestinationKind::Stderr);
    }
}
