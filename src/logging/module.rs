use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::logging::destination::{DestinationKind, LogDestination};
use crate::logging::Severity;

type DestinationTable =
    [[Option<Arc<dyn LogDestination>>; DestinationKind::COUNT]; Severity::COUNT];

/// 日志模块
///
/// 一个具名的日志通道，拥有自己的最低级别、字节配额，
/// 以及 级别 × 目标类型 → 目标 的路由表。
///
/// 字节配额是进程生命周期内的累计上限，不会重置
pub struct LogModule {
    name: String,
    min_severity: AtomicU8,
    verbose: AtomicBool,
    n_bytes: AtomicU64,
    max_bytes: AtomicU64,
    dropped: AtomicU64,
    destinations: RwLock<DestinationTable>,
}

impl LogModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_severity: AtomicU8::new(Severity::Info as u8),
            verbose: AtomicBool::new(true),
            n_bytes: AtomicU64::new(0),
            max_bytes: AtomicU64::new(u64::MAX),
            dropped: AtomicU64::new(0),
            destinations: RwLock::new(Default::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 在指定级别绑定一个目标
    ///
    /// 按目标自身的类型放入路由表，同一 (级别, 类型) 上后绑定的覆盖先绑定的。
    /// 应在并发写日志开始前的初始化阶段调用
    pub fn add_log_destination(&self, destination: Arc<dyn LogDestination>, severity: Severity) {
        let kind = destination.kind();
        let mut table = self
            .destinations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table[severity.index()][kind.index()] = Some(destination);
    }

    /// 获取 (级别, 类型) 上绑定的目标
    pub fn destination(
        &self,
        severity: Severity,
        kind: DestinationKind,
    ) -> Option<Arc<dyn LogDestination>> {
        let table = self
            .destinations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table[severity.index()][kind.index()].clone()
    }

    /// 获取某个级别上绑定的全部目标，按 [`DestinationKind::ALL`] 的顺序
    pub fn destinations(&self, severity: Severity) -> Vec<Arc<dyn LogDestination>> {
        let table = self
            .destinations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table[severity.index()].iter().flatten().cloned().collect()
    }

    pub fn set_min_severity(&self, severity: Severity) {
        self.min_severity.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity(&self) -> Severity {
        Severity::from_index(self.min_severity.load(Ordering::Relaxed))
    }

    pub fn set_verbose(&self, on: bool) {
        self.verbose.store(on, Ordering::Relaxed);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    pub fn set_max_bytes(&self, max_bytes: u64) {
        self.max_bytes.store(max_bytes, Ordering::Relaxed);
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes.load(Ordering::Relaxed)
    }

    /// 已分发的累计字节数
    pub fn n_bytes(&self) -> u64 {
        self.n_bytes.load(Ordering::Relaxed)
    }

    pub fn quota_exceeded(&self) -> bool {
        self.n_bytes() >= self.max_bytes()
    }

    /// 因级别过低或配额用尽而被丢弃的记录数
    pub fn dropped_records(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// 该级别的记录是否需要构造
    ///
    /// `Fatal` 总是需要，它一定会终止进程
    pub fn should_log(&self, severity: Severity) -> bool {
        severity == Severity::Fatal || severity >= self.min_severity()
    }

    pub(crate) fn record_dispatched(&self, bytes: u64) {
        self.n_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    #[doc(hidden)]
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for LogModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogModule")
            .field("name", &self.name)
            .field("min_severity", &self.min_severity())
            .field("verbose", &self.is_verbose())
            .field("n_bytes", &self.n_bytes())
            .field("max_bytes", &self.max_bytes())
            .finish()
    }
}
