use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, RwLock};

use crate::cfg::TypeOptions;
use crate::logging::destination::{
    create_destination_from_options, register_destinations, FileDestination,
    FileDestinationConfig, LogDestination, StderrDestination,
};
use crate::logging::message::MessageData;
use crate::logging::{LogConfig, LogError, LogMessage, LogModule, LogOptions, Result, Severity};
use crate::strings::number_to_string;
use crate::sync::{AutoLock, Lock};
use crate::time::{Clock, SystemClock, Time};

/// 内部诊断模块的名称
pub const INTERNAL_MODULE_NAME: &str = "log";

/// 致命记录刷新后调用的失败函数
pub type FailureFunction = fn() -> !;

fn default_failure_function() -> ! {
    std::process::abort()
}

static GLOBAL_CONTEXT: Lazy<LogContext> = Lazy::new(|| {
    register_exit_flush();
    LogContext::new()
});

/// 进程正常退出时刷新全局上下文，缓冲区中的记录不会丢失
#[cfg(unix)]
fn register_exit_flush() {
    extern "C" fn flush_global_at_exit() {
        if let Some(context) = Lazy::get(&GLOBAL_CONTEXT) {
            context.flush_all();
        }
    }

    // SAFETY: 回调是不会展开的 extern "C" 函数，只访问 'static 数据
    if unsafe { libc::atexit(flush_global_at_exit) } != 0 {
        log::warn!("failed to register exit flush for the global log context");
    }
}

#[cfg(not(unix))]
fn register_exit_flush() {}

/// 日志上下文
///
/// 持有模块注册表、文件目标表、全局分发锁、预分配的致命记录槽和失败函数。
/// 宏使用 [`LogContext::global`]，测试或嵌入场景可以自行构造独立的上下文。
///
/// 上下文构造时注册一个名为 `log` 的内部模块，WARNING 及以上级别输出到标准错误，
/// 用于报告模块配额用尽等运行时事件
pub struct LogContext {
    options: RwLock<LogOptions>,
    clock: Arc<dyn Clock>,
    modules: RwLock<Vec<Arc<LogModule>>>,
    internal: Arc<LogModule>,
    file_destinations: RwLock<HashMap<String, Arc<FileDestination>>>,
    owned_destinations: RwLock<Vec<Arc<dyn LogDestination>>>,
    /// 上下文内所有标准错误绑定共用的目标
    stderr: Arc<dyn LogDestination>,
    dispatch: Lock,
    fatal_slot: Lock<MessageData>,
    failure_function: RwLock<FailureFunction>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::with_options(LogOptions::default())
    }

    pub fn with_options(options: LogOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: LogOptions, clock: Arc<dyn Clock>) -> Self {
        let options = options.clamped();
        let internal = Arc::new(LogModule::new(INTERNAL_MODULE_NAME));
        let stderr: Arc<dyn LogDestination> = Arc::new(StderrDestination::default());
        for severity in [Severity::Warning, Severity::Error, Severity::Fatal] {
            internal.add_log_destination(stderr.clone(), severity);
        }

        Self {
            fatal_slot: Lock::new(MessageData::with_capacity(options.max_message_len)),
            options: RwLock::new(options),
            clock,
            modules: RwLock::new(vec![internal.clone()]),
            internal,
            file_destinations: RwLock::new(HashMap::new()),
            owned_destinations: RwLock::new(vec![stderr.clone()]),
            stderr,
            dispatch: Lock::new(()),
            failure_function: RwLock::new(default_failure_function as FailureFunction),
        }
    }

    /// 进程级的全局上下文，第一次使用时构造
    pub fn global() -> &'static LogContext {
        &GLOBAL_CONTEXT
    }

    pub fn options(&self) -> LogOptions {
        self.options
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 替换运行参数
    ///
    /// 致命记录槽的容量在构造时确定，不随 `max_message_len` 变化
    pub fn set_options(&self, options: LogOptions) {
        *self
            .options
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = options.clamped();
    }

    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// 获取模块，不存在时注册一个新模块
    pub fn module(&self, name: &str) -> Arc<LogModule> {
        if let Some(module) = self.find_module(name) {
            return module;
        }

        let mut modules = self
            .modules
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // 拿到写锁之前可能已被其他线程注册
        if let Some(module) = modules.iter().find(|m| m.name() == name) {
            return module.clone();
        }
        let module = Arc::new(LogModule::new(name));
        modules.push(module.clone());
        module
    }

    pub fn find_module(&self, name: &str) -> Option<Arc<LogModule>> {
        self.modules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|m| m.name() == name)
            .cloned()
    }

    /// 获取已注册的模块，不存在时返回 [`LogError::UnknownModule`]
    pub fn get_module(&self, name: &str) -> Result<Arc<LogModule>> {
        self.find_module(name)
            .ok_or_else(|| LogError::UnknownModule(name.to_string()))
    }

    /// 所有已注册的模块，按注册顺序
    pub fn modules(&self) -> Vec<Arc<LogModule>> {
        self.modules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 内部诊断模块
    pub fn internal_module(&self) -> &LogModule {
        &self.internal
    }

    /// 为模块添加文件目标
    ///
    /// 同一路径只创建一个 [`FileDestination`]，被所有绑定它的模块和级别共享。
    /// 目标绑定到不低于 `threshold` 的每个级别
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// use basex::logging::{LogContext, Severity};
    ///
    /// let context = LogContext::global();
    /// context.add_file_destination("net", "INFO", "/tmp/net.log").unwrap();
    /// context.add_file_destination("db", Severity::Error, "/tmp/db.log").unwrap();
    /// ```
    pub fn add_file_destination<S>(
        &self,
        module_name: &str,
        threshold: S,
        file_path: &str,
    ) -> Result<Arc<FileDestination>>
    where
        S: TryInto<Severity>,
        LogError: From<S::Error>,
    {
        let threshold = threshold.try_into()?;
        let mut config = FileDestinationConfig::new(file_path);
        config.flush_interval_secs = self.options().flush_interval_secs;
        let destination = self.shared_file_destination(config);
        self.bind(module_name, threshold, destination.clone());
        Ok(destination)
    }

    /// 为模块添加标准错误目标，绑定到不低于 `threshold` 的每个级别
    pub fn add_stderr_destination<S>(&self, module_name: &str, threshold: S) -> Result<()>
    where
        S: TryInto<Severity>,
        LogError: From<S::Error>,
    {
        let threshold = threshold.try_into()?;
        self.bind(module_name, threshold, self.stderr.clone());
        Ok(())
    }

    /// 为模块添加任意目标，绑定到不低于 `threshold` 的每个级别
    pub fn add_destination(
        &self,
        module_name: &str,
        threshold: Severity,
        destination: Arc<dyn LogDestination>,
    ) {
        self.own(destination.clone());
        self.bind(module_name, threshold, destination);
    }

    /// 已创建的文件目标
    pub fn file_destination(&self, file_path: &str) -> Option<Arc<FileDestination>> {
        self.file_destinations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(file_path)
            .cloned()
    }

    /// 按配置设置运行参数、模块属性和目标绑定
    ///
    /// 应在并发写日志开始前调用。出错时已经应用的部分不会回滚
    pub fn configure(&self, config: &LogConfig) -> Result<()> {
        register_destinations()?;
        self.set_options(config.options.clone());

        for (name, module_config) in &config.modules {
            let module = self.module(name);
            module.set_min_severity(module_config.min_severity);
            module.set_verbose(module_config.verbose);
            module.set_max_bytes(module_config.max_bytes);

            for binding in &module_config.destinations {
                let destination = self.destination_from_options(&binding.destination)?;
                self.bind(name, binding.severity, destination);
            }
        }
        Ok(())
    }

    /// 刷新所有目标
    pub fn flush_all(&self) {
        let destinations = self
            .owned_destinations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for destination in destinations {
            destination.flush();
        }
    }

    /// 设置致命记录刷新后调用的失败函数，默认是 `std::process::abort`
    pub fn set_failure_function(&self, function: FailureFunction) {
        *self
            .failure_function
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = function;
    }

    pub(crate) fn fail(&self) -> ! {
        let function = *self
            .failure_function
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        function()
    }

    pub(crate) fn dispatch_lock(&self) -> AutoLock<'_> {
        self.dispatch.acquire()
    }

    pub(crate) fn fatal_slot(&self) -> AutoLock<'_, MessageData> {
        self.fatal_slot.acquire()
    }

    pub(crate) fn warn_quota_exceeded(&self, module: &LogModule) {
        if std::ptr::eq(module, &*self.internal) {
            log::warn!(
                "module({})'s max size has exceed({})",
                module.name(),
                module.max_bytes()
            );
            return;
        }

        let mut message = LogMessage::new(self, &self.internal, file!(), line!(), Severity::Warning);
        let _ = write!(
            message,
            "module({})'s max size has exceed({})",
            module.name(),
            number_to_string(module.max_bytes())
        );
    }

    fn bind(&self, module_name: &str, threshold: Severity, destination: Arc<dyn LogDestination>) {
        let module = self.module(module_name);
        for severity in Severity::ALL.into_iter().filter(|s| *s >= threshold) {
            module.add_log_destination(destination.clone(), severity);
        }
    }

    fn own(&self, destination: Arc<dyn LogDestination>) {
        let mut owned = self
            .owned_destinations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !owned.iter().any(|d| Arc::ptr_eq(d, &destination)) {
            owned.push(destination);
        }
    }

    fn shared_file_destination(&self, config: FileDestinationConfig) -> Arc<FileDestination> {
        let mut files = self
            .file_destinations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(destination) = files.get(&config.file_path) {
            return destination.clone();
        }

        let path = config.file_path.clone();
        let destination = Arc::new(FileDestination::with_clock(config, self.clock.clone()));
        files.insert(path, destination.clone());
        drop(files);

        self.own(destination.clone());
        destination
    }

    fn destination_from_options(&self, options: &TypeOptions) -> Result<Arc<dyn LogDestination>> {
        // 文件目标按路径共享
        if options.type_name == "FileDestination" {
            let config: FileDestinationConfig = if options.options.is_null() {
                FileDestinationConfig::default()
            } else {
                serde_json::from_value(options.options.clone()).map_err(anyhow::Error::from)?
            };
            let destination: Arc<dyn LogDestination> = self.shared_file_destination(config);
            return Ok(destination);
        }
        if options.type_name == "StderrDestination" {
            return Ok(self.stderr.clone());
        }

        let destination: Arc<dyn LogDestination> = create_destination_from_options(options)?.into();
        self.own(destination.clone());
        Ok(destination)
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}
