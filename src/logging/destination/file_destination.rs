use serde::Deserialize;
use smart_default::SmartDefault;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::logging::destination::{DestinationKind, LogDestination};
use crate::logging::os::is_disk_full;
use crate::logging::Severity;
use crate::sync::Lock;
use crate::time::{Clock, SystemClock, Time, TimeDelta};

/// FileDestination 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct FileDestinationConfig {
    /// 日志文件路径，为空时所有写入都是空操作
    pub file_path: String,

    /// 距上次刷新累计超过该字节数时立即刷新
    #[default(1_000_000)]
    pub flush_threshold_bytes: u64,

    /// 日志最多在缓冲区停留的秒数
    #[default(30)]
    pub flush_interval_secs: u64,

    /// 文件累计写入字节上限，达到后拒绝继续写入
    #[default(u64::MAX)]
    pub max_bytes: u64,
}

impl FileDestinationConfig {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }
}

struct FileState {
    file: Option<File>,
    /// 打开失败后不再重试，之后的写入全部丢弃
    open_failed: bool,
    /// 已接受的字节数，包括还在 pending 中的部分；刷新失败时扣除丢弃的字节
    file_length: u64,
    /// 等待刷新的记录
    pending: Vec<u8>,
    next_flush_time: Time,
}

/// 文件日志目标
///
/// - 第一次写入时才创建文件（截断已有内容），并直接写入一次创建时间头
/// - 记录先进入缓冲区，字节数超过阈值、到达刷新时间或调用方要求时写入文件
/// - 打开失败、磁盘满、超过大小上限都只丢弃记录，不会报错
///
/// 所有操作在目标自己的锁内完成，不同目标之间互不阻塞
pub struct FileDestination {
    config: FileDestinationConfig,
    clock: Arc<dyn Clock>,
    state: Lock<FileState>,
}

impl FileDestination {
    pub fn new(config: FileDestinationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: FileDestinationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Lock::new(FileState {
                file: None,
                open_failed: false,
                file_length: 0,
                pending: Vec::new(),
                next_flush_time: Time::default(),
            }),
        }
    }

    /// 获取日志文件路径
    pub fn path(&self) -> &str {
        &self.config.file_path
    }

    pub fn config(&self) -> &FileDestinationConfig {
        &self.config
    }

    /// 文件是否已经打开
    pub fn is_open(&self) -> bool {
        self.state.acquire().file.is_some()
    }

    fn flush_interval(&self) -> TimeDelta {
        TimeDelta::from_seconds(i64::try_from(self.config.flush_interval_secs).unwrap_or(i64::MAX))
    }

    fn create_log_file(&self, timestamp: Time) -> io::Result<(File, u64)> {
        let path = Path::new(&self.config.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let existed = path.exists();
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o664);
        }
        // std 在 Unix 上默认以 O_CLOEXEC 打开
        let mut file = options.open(path)?;

        let header = file_header(timestamp);
        if let Err(e) = file.write_all(header.as_bytes()) {
            // 只删除本次新建的文件，已有的路径（比如设备文件）保持原样
            if !existed {
                let _ = fs::remove_file(path);
            }
            return Err(e);
        }
        Ok((file, header.len() as u64))
    }

    fn flush_unlocked(&self, state: &mut FileState, now: Time) {
        if let Some(file) = state.file.as_mut() {
            let buffered = state.pending.len();
            if let Err(e) = drain_pending(file, &mut state.pending, &mut state.file_length) {
                if is_disk_full(&e) {
                    log::warn!(
                        "disk full, dropping {} buffered bytes for {}",
                        buffered,
                        self.config.file_path
                    );
                } else {
                    log::warn!("failed to write log file {}: {}", self.config.file_path, e);
                }
            }
        }
        state.next_flush_time = now + self.flush_interval();
    }
}

/// 把 pending 写入 writer 并清空；失败时没有落盘的字节从 `file_length` 中扣除
fn drain_pending(
    writer: &mut impl Write,
    pending: &mut Vec<u8>,
    file_length: &mut u64,
) -> io::Result<()> {
    let mut written = 0;
    let mut result = Ok(());
    while written < pending.len() {
        match writer.write(&pending[written..]) {
            Ok(0) => {
                result = Err(io::ErrorKind::WriteZero.into());
                break;
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    *file_length = file_length.saturating_sub((pending.len() - written) as u64);
    pending.clear();
    result
}

impl LogDestination for FileDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::File
    }

    fn write(&self, force_flush: bool, _severity: Severity, timestamp: Time, message: &[u8]) {
        if self.config.file_path.is_empty() {
            return;
        }

        let mut state = self.state.acquire();
        if state.file.is_none() {
            if state.open_failed {
                return;
            }
            match self.create_log_file(timestamp) {
                Ok((file, header_len)) => {
                    state.file = Some(file);
                    state.file_length += header_len;
                    state.next_flush_time = self.clock.now() + self.flush_interval();
                }
                Err(e) if is_disk_full(&e) => {
                    log::warn!("disk full, can not create log file {}", self.config.file_path);
                    state.open_failed = true;
                    return;
                }
                Err(e) => {
                    log::warn!("can not open log file {}: {}", self.config.file_path, e);
                    state.open_failed = true;
                    return;
                }
            }
        }

        if state.file_length >= self.config.max_bytes {
            log::warn!(
                "{} has exceeded its max length ({} bytes)",
                self.config.file_path,
                self.config.max_bytes
            );
            return;
        }

        state.pending.extend_from_slice(message);
        state.file_length += message.len() as u64;

        let now = self.clock.now();
        if force_flush
            || state.pending.len() as u64 >= self.config.flush_threshold_bytes
            || now >= state.next_flush_time
        {
            self.flush_unlocked(&mut state, now);
        }
    }

    fn flush(&self) {
        let mut state = self.state.acquire();
        let now = self.clock.now();
        self.flush_unlocked(&mut state, now);
    }

    fn log_size(&self) -> u64 {
        self.state.acquire().file_length
    }
}

/// 文件创建时写入的头部，使用本地时间
fn file_header(timestamp: Time) -> String {
    format!(
        "Log file created at: {}\n\n",
        timestamp.to_local().format("%Y/%m/%d %H:%M:%S")
    )
}

crate::impl_from!(FileDestinationConfig => FileDestination);
crate::impl_box_from!(FileDestination => dyn LogDestination);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    fn record(text: &str) -> Vec<u8> {
        format!("{}\n", text).into_bytes()
    }

    fn config_for(path: &Path) -> FileDestinationConfig {
        FileDestinationConfig::new(path.to_string_lossy().to_string())
    }

    #[test]
    fn test_config_default() {
        let config = FileDestinationConfig::default();
        assert!(config.file_path.is_empty());
        assert_eq!(config.flush_threshold_bytes, 1_000_000);
        assert_eq!(config.flush_interval_secs, 30);
        assert_eq!(config.max_bytes, u64::MAX);
    }

    #[test]
    fn test_config_from_json5() {
        let config: FileDestinationConfig = json5::from_str(
            r#"{ file_path: "/tmp/x.log", flush_interval_secs: 5 }"#,
        )
        .unwrap();
        assert_eq!(config.file_path, "/tmp/x.log");
        assert_eq!(config.flush_interval_secs, 5);
        assert_eq!(config.flush_threshold_bytes, 1_000_000);
    }

    #[test]
    fn test_lazy_open_and_header() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("lazy.log");
        let dst = FileDestination::new(config_for(&path));

        assert!(!path.exists());
        assert!(!dst.is_open());

        dst.write(true, Severity::Info, Time::now(), &record("hello"));
        assert!(dst.is_open());

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Log file created at: "));
        let header_end = contents.find("\n\n").unwrap();
        // YYYY/MM/DD HH:MM:SS
        assert_eq!(header_end - "Log file created at: ".len(), 19);
        assert!(contents.ends_with("hello\n"));
        assert_eq!(dst.log_size(), contents.len() as u64);
    }

    #[test]
    fn test_header_written_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("once.log");
        let dst = FileDestination::new(config_for(&path));

        dst.write(false, Severity::Info, Time::now(), &record("first"));
        dst.write(false, Severity::Info, Time::now(), &record("second"));
        dst.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Log file created at:").count(), 1);
        assert!(contents.ends_with("first\nsecond\n"));
    }

    #[test]
    fn test_truncates_existing_file() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "stale content\n").unwrap();

        let dst = FileDestination::new(config_for(temp_file.path()));
        dst.write(true, Severity::Info, Time::now(), &record("fresh"));

        let contents = fs::read_to_string(temp_file.path()).unwrap();
        assert!(!contents.contains("stale content"));
        assert!(contents.contains("fresh"));
    }

    #[test]
    fn test_empty_path_is_noop() {
        let dst = FileDestination::new(FileDestinationConfig::default());
        dst.write(true, Severity::Error, Time::now(), &record("nowhere"));
        dst.flush();
        assert_eq!(dst.log_size(), 0);
        assert!(!dst.is_open());
    }

    #[test]
    fn test_open_failure_is_absorbed() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        // 父路径是普通文件，无法创建
        let path = temp_file.path().join("child.log");
        let dst = FileDestination::new(config_for(&path));

        dst.write(true, Severity::Info, Time::now(), &record("lost"));
        dst.write(true, Severity::Info, Time::now(), &record("lost again"));
        assert_eq!(dst.log_size(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.log");
        let dst = FileDestination::new(config_for(&path));

        dst.write(true, Severity::Info, Time::now(), &record("Test"));
        assert!(path.exists());
    }

    #[test]
    fn test_byte_threshold_triggers_flush() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("threshold.log");
        let mut config = config_for(&path);
        config.flush_threshold_bytes = 4096;
        let dst = FileDestination::new(config);

        dst.write(false, Severity::Info, Time::now(), &record("small"));
        // 头部已经落盘，小记录还在缓冲区里
        let header_len = dst.log_size() - record("small").len() as u64;
        assert_eq!(fs::metadata(&path).unwrap().len(), header_len);

        let big = vec![b'x'; 4097];
        dst.write(false, Severity::Info, Time::now(), &big);
        assert_eq!(fs::metadata(&path).unwrap().len(), dst.log_size());
    }

    #[test]
    fn test_deadline_triggers_flush() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("deadline.log");
        let clock = Arc::new(ManualClock::new(Time::from_time_t(1_000)));
        let dst = FileDestination::with_clock(config_for(&path), clock.clone());

        dst.write(false, Severity::Info, clock.now(), &record("buffered"));
        assert!(!fs::read_to_string(&path).unwrap().contains("buffered"));

        clock.advance(TimeDelta::from_seconds(29));
        dst.write(false, Severity::Info, clock.now(), &record("still buffered"));
        assert!(!fs::read_to_string(&path).unwrap().contains("buffered"));

        clock.advance(TimeDelta::from_seconds(2));
        dst.write(false, Severity::Info, clock.now(), &record("flushed"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("buffered\nstill buffered\nflushed\n"));
    }

    #[test]
    fn test_max_bytes_rejects_writes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("capped.log");
        let mut config = config_for(&path);
        config.max_bytes = 10;
        let dst = FileDestination::new(config);

        // 头部本身已超过上限，记录被拒绝
        dst.write(true, Severity::Info, Time::now(), &record("rejected"));
        dst.flush();
        let size = fs::metadata(&path).unwrap().len();
        assert_eq!(size, dst.log_size());
        assert!(!fs::read_to_string(&path).unwrap().contains("rejected"));

        dst.write(true, Severity::Info, Time::now(), &record("rejected again"));
        assert_eq!(fs::metadata(&path).unwrap().len(), size);
    }

    /// 接受 `capacity` 字节后返回 ENOSPC
    struct FullAfter {
        capacity: usize,
        data: Vec<u8>,
    }

    impl Write for FullAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.capacity - self.data.len());
            if n == 0 {
                return Err(io::Error::from_raw_os_error(28));
            }
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_drain_pending_rolls_back_unwritten_bytes() {
        let mut writer = FullAfter { capacity: 4, data: Vec::new() };
        let mut pending = b"abcdefgh".to_vec();
        let mut file_length = 100 + pending.len() as u64;

        let err = drain_pending(&mut writer, &mut pending, &mut file_length).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(28));
        assert_eq!(writer.data, b"abcd");
        assert!(pending.is_empty());
        assert_eq!(file_length, 104);

        // 磁盘已满，后续记录全部丢弃，计数不变
        pending.extend_from_slice(b"more");
        file_length += 4;
        assert!(drain_pending(&mut writer, &mut pending, &mut file_length).is_err());
        assert_eq!(file_length, 104);
    }

    #[test]
    fn test_drain_pending_success() {
        let mut writer = FullAfter { capacity: 64, data: Vec::new() };
        let mut pending = b"record\n".to_vec();
        let mut file_length = 7;

        drain_pending(&mut writer, &mut pending, &mut file_length).unwrap();
        assert_eq!(writer.data, b"record\n");
        assert!(pending.is_empty());
        assert_eq!(file_length, 7);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_disk_full_device_drops_records() {
        let path = Path::new("/dev/full");
        if !path.exists() {
            return;
        }
        let dst = FileDestination::new(config_for(path));

        dst.write(true, Severity::Error, Time::now(), &record("first"));
        dst.write(true, Severity::Error, Time::now(), &record("second"));
        dst.flush();

        assert_eq!(dst.log_size(), 0);
        assert!(!dst.is_open());
        // 已有路径不会被删除
        assert!(path.exists());
    }

    #[test]
    fn test_from_config() {
        let dst = FileDestination::from(FileDestinationConfig::new("/tmp/test.log"));
        assert_eq!(dst.path(), "/tmp/test.log");
        assert_eq!(dst.kind(), DestinationKind::File);
    }
}
