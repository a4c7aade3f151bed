use std::borrow::Cow;
use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::io;
use std::ops::{Deref, DerefMut};

use crate::logging::destination::DestinationKind;
use crate::logging::{os, LogContext, LogModule, Severity, MAX_MESSAGE_LEN_LIMIT};
use crate::sync::AutoLock;
use crate::time::Time;

thread_local! {
    // 当前线程是否持有致命记录槽
    static HOLDS_FATAL_SLOT: Cell<bool> = const { Cell::new(false) };
}

fn holds_fatal_slot() -> bool {
    HOLDS_FATAL_SLOT.try_with(Cell::get).unwrap_or(false)
}

fn set_holds_fatal_slot(on: bool) {
    let _ = HOLDS_FATAL_SLOT.try_with(|flag| flag.set(on));
}

/// 一条记录的缓冲区与元数据
///
/// 缓冲区预留 `capacity + 1` 字节，多出的 1 字节留给刷新时临时追加的换行
#[derive(Debug)]
pub(crate) struct MessageData {
    buffer: Vec<u8>,
    capacity: usize,
    prefix_len: usize,
    truncated: bool,
    has_been_flushed: bool,
    timestamp: Time,
    preserved_errno: i32,
}

impl MessageData {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_MESSAGE_LEN_LIMIT);
        Self {
            buffer: Vec::with_capacity(capacity + 1),
            capacity,
            prefix_len: 0,
            truncated: false,
            has_been_flushed: false,
            timestamp: Time::default(),
            preserved_errno: 0,
        }
    }

    // 原地重置，不重新分配
    fn reset(&mut self, timestamp: Time, preserved_errno: i32) {
        self.buffer.clear();
        self.prefix_len = 0;
        self.truncated = false;
        self.has_been_flushed = false;
        self.timestamp = timestamp;
        self.preserved_errno = preserved_errno;
    }

    fn room(&self) -> usize {
        self.capacity.saturating_sub(self.buffer.len())
    }

    fn append_bytes(&mut self, bytes: &[u8]) {
        let room = self.room();
        if bytes.len() > room {
            self.buffer.extend_from_slice(&bytes[..room]);
            self.truncated = true;
        } else {
            self.buffer.extend_from_slice(bytes);
        }
    }
}

impl fmt::Write for MessageData {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.room();
        if s.len() <= room {
            self.buffer.extend_from_slice(s.as_bytes());
            return Ok(());
        }

        // 截断在字符边界上，保证文本仍是合法 UTF-8
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buffer.extend_from_slice(&s.as_bytes()[..end]);
        self.truncated = true;
        Ok(())
    }
}

enum Slot<'a> {
    Owned(Box<MessageData>),
    Fatal(AutoLock<'a, MessageData>),
}

impl Deref for Slot<'_> {
    type Target = MessageData;

    fn deref(&self) -> &MessageData {
        match self {
            Slot::Owned(data) => data,
            Slot::Fatal(data) => data,
        }
    }
}

impl DerefMut for Slot<'_> {
    fn deref_mut(&mut self) -> &mut MessageData {
        match self {
            Slot::Owned(data) => data,
            Slot::Fatal(data) => data,
        }
    }
}

/// 一条日志记录
///
/// 构造时写好前缀，之后通过 `fmt::Write` / `io::Write` 追加正文，
/// 析构时（或显式调用 [`LogMessage::flush`]）分发到模块在该级别绑定的目标。
///
/// - 低于模块最低级别、或模块配额已用尽的非致命记录是惰性的：
///   不格式化、不分发，写入被静默丢弃
/// - 缓冲区有上限，超出部分被丢弃并设置截断标记，写入永远不会失败
/// - 刷新是幂等的，第二次调用什么也不做
/// - 刷新结束后恢复构造时保存的 errno
/// - `Fatal` 记录使用上下文预分配的记录槽，刷新后调用上下文的失败函数
///
/// # 示例
///
/// ```rust,no_run
/// use std::fmt::Write;
/// use basex::logging::{LogContext, LogMessage, Severity};
///
/// let context = LogContext::global();
/// let module = context.module("net");
/// let mut message = LogMessage::new(context, &module, file!(), line!(), Severity::Info);
/// write!(message, "connected to {}", "127.0.0.1:80").unwrap();
/// ```
pub struct LogMessage<'a> {
    context: &'a LogContext,
    module: &'a LogModule,
    severity: Severity,
    data: Option<Slot<'a>>,
}

impl<'a> LogMessage<'a> {
    pub fn new(
        context: &'a LogContext,
        module: &'a LogModule,
        file: &str,
        line: u32,
        severity: Severity,
    ) -> Self {
        // 之后的任何调用都可能改写 errno
        let preserved_errno = os::errno();

        if severity != Severity::Fatal {
            if !module.should_log(severity) {
                module.record_dropped();
                return Self::inert(context, module, severity);
            }
            if module.quota_exceeded() {
                module.record_dropped();
                context.warn_quota_exceeded(module);
                os::set_errno(preserved_errno);
                return Self::inert(context, module, severity);
            }
        }

        let mut data = if severity == Severity::Fatal && !holds_fatal_slot() {
            let slot = context.fatal_slot();
            set_holds_fatal_slot(true);
            Slot::Fatal(slot)
        } else {
            // 格式化致命记录的过程中又触发了致命记录，不能再等待记录槽
            Slot::Owned(Box::new(MessageData::with_capacity(
                context.options().max_message_len,
            )))
        };

        let timestamp = context.now();
        data.reset(timestamp, preserved_errno);
        write_prefix(&mut data, severity, timestamp, file, line);
        data.prefix_len = data.buffer.len();

        Self {
            context,
            module,
            severity,
            data: Some(data),
        }
    }

    fn inert(context: &'a LogContext, module: &'a LogModule, severity: Severity) -> Self {
        Self {
            context,
            module,
            severity,
            data: None,
        }
    }

    /// 返回自身，便于链式写入
    pub fn stream(&mut self) -> &mut Self {
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn module(&self) -> &LogModule {
        self.module
    }

    /// 记录是否会被分发
    pub fn is_active(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_truncated(&self) -> bool {
        self.data.as_deref().is_some_and(|data| data.truncated)
    }

    pub fn is_flushed(&self) -> bool {
        self.data.as_deref().is_some_and(|data| data.has_been_flushed)
    }

    pub fn timestamp(&self) -> Option<Time> {
        self.data.as_deref().map(|data| data.timestamp)
    }

    /// 前缀之后的正文
    pub fn text(&self) -> Cow<'_, str> {
        match self.data.as_deref() {
            Some(data) => String::from_utf8_lossy(&data.buffer[data.prefix_len..]),
            None => Cow::Borrowed(""),
        }
    }

    /// 含前缀的整条记录
    pub fn as_bytes(&self) -> &[u8] {
        match self.data.as_deref() {
            Some(data) => &data.buffer,
            None => &[],
        }
    }

    pub fn prefix_len(&self) -> usize {
        self.data.as_deref().map_or(0, |data| data.prefix_len)
    }

    /// 分发到模块在该级别绑定的所有目标
    pub fn flush(&mut self) {
        let Some(data) = self.data.as_deref_mut() else {
            return;
        };
        if data.has_been_flushed {
            return;
        }

        let appended = data.buffer.last() != Some(&b'\n');
        if appended {
            data.buffer.push(b'\n');
        }

        let force_flush = self.severity == Severity::Fatal
            || self.severity >= self.context.options().force_flush_severity;
        {
            let _dispatch = self.context.dispatch_lock();
            for kind in DestinationKind::ALL {
                if let Some(destination) = self.module.destination(self.severity, kind) {
                    destination.write(force_flush, self.severity, data.timestamp, &data.buffer);
                }
            }
            self.module.record_dispatched(data.buffer.len() as u64);
        }

        if appended {
            data.buffer.pop();
        }
        os::set_errno(data.preserved_errno);
        data.has_been_flushed = true;
    }

    /// 刷新后调用失败函数，不再返回
    pub fn fail(mut self) -> ! {
        self.flush();
        self.release_and_fail()
    }

    fn release_and_fail(&mut self) -> ! {
        if let Some(Slot::Fatal(slot)) = self.data.take() {
            slot.release();
            set_holds_fatal_slot(false);
        }
        self.context.fail()
    }
}

fn write_prefix(data: &mut MessageData, severity: Severity, timestamp: Time, file: &str, line: u32) {
    let exploded = timestamp.local_explode();
    let basename = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let _ = write!(
        data,
        "{}{:02}{:02} {:02}:{:02}:{:02}:{:06} {:>5} {}:{}] ",
        severity.code(),
        exploded.month,
        exploded.day_of_month,
        exploded.hour,
        exploded.minute,
        exploded.second,
        timestamp.subsec_micros(),
        os::thread_id(),
        basename,
        line,
    );
}

impl fmt::Write for LogMessage<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(data) = self.data.as_deref_mut() {
            data.write_str(s)?;
        }
        Ok(())
    }
}

impl io::Write for LogMessage<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(data) = self.data.as_deref_mut() {
            data.append_bytes(buf);
        }
        Ok(buf.len())
    }

    // 不分发记录，分发只发生在 LogMessage::flush 或析构时
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogMessage<'_> {
    fn drop(&mut self) {
        if self.data.is_none() {
            return;
        }
        self.flush();
        if self.severity == Severity::Fatal {
            self.release_and_fail();
        }
    }
}

impl fmt::Debug for LogMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogMessage")
            .field("module", &self.module.name())
            .field("severity", &self.severity)
            .field("active", &self.is_active())
            .field("flushed", &self.is_flushed())
            .field("truncated", &self.is_truncated())
            .finish()
    }
}
