//! 日志宏
//!
//! 所有宏都使用全局上下文 [`LogContext::global`](crate::logging::LogContext::global)，
//! 自动记录调用处的文件名和行号。级别写作 `Info` / `Warning` / `Error` / `Fatal`
//!
//! # 示例
//!
//! ```rust,no_run
//! use basex::{define_log_module, log, log_if};
//!
//! define_log_module!(net);
//!
//! fn connect(addr: &str, retries: u32) {
//!     log!(Info, "connecting to {}", addr);
//!     log_if!(Warning, retries > 3, "too many retries: {}", retries);
//! }
//! ```

/// 为当前 Rust 模块定义环境日志模块，供 [`log!`] 等宏使用
///
/// 日志模块在第一次写日志时注册到全局上下文
#[macro_export]
macro_rules! define_log_module {
    ($name:ident) => {
        $crate::define_log_module!(stringify!($name));
    };
    ($name:expr) => {
        #[allow(dead_code)]
        static __BASEX_LOG_MODULE: $crate::__private::Lazy<
            ::std::sync::Arc<$crate::logging::LogModule>,
        > = $crate::__private::Lazy::new(|| $crate::logging::LogContext::global().module($name));
    };
}

/// 写入指定日志模块
///
/// 模块参数可以是 `LogModule`、`Arc<LogModule>` 或者它们的引用。
/// `ctx => module` 的形式写入指定的上下文
///
/// ```rust,no_run
/// use basex::logging::LogContext;
/// use basex::mlog;
///
/// let db = LogContext::global().module("db");
/// mlog!(db, Error, "query failed: {}", "timeout");
///
/// let context = LogContext::new();
/// let cache = context.module("cache");
/// mlog!(&context => cache, Info, "evicted {} keys", 10);
/// ```
#[macro_export]
macro_rules! mlog {
    ($context:expr => $module:expr, $severity:ident, $($arg:tt)+) => {{
        let __context: &$crate::logging::LogContext = $context;
        let __module: &$crate::logging::LogModule = &$module;
        if __module.should_log($crate::logging::Severity::$severity) {
            let mut __message = $crate::logging::LogMessage::new(
                __context,
                __module,
                file!(),
                line!(),
                $crate::logging::Severity::$severity,
            );
            let _ = ::std::fmt::Write::write_fmt(&mut __message, format_args!($($arg)+));
        } else {
            __module.record_dropped();
        }
    }};
    ($module:expr, $severity:ident, $($arg:tt)+) => {
        $crate::mlog!($crate::logging::LogContext::global() => $module, $severity, $($arg)+)
    };
}

/// 写入 [`define_log_module!`] 定义的环境日志模块
#[macro_export]
macro_rules! log {
    ($severity:ident, $($arg:tt)+) => {
        $crate::mlog!(__BASEX_LOG_MODULE, $severity, $($arg)+)
    };
}

/// 条件成立时写入环境日志模块，条件不成立时不构造记录也不格式化参数
#[macro_export]
macro_rules! log_if {
    ($severity:ident, $condition:expr, $($arg:tt)+) => {
        if $condition {
            $crate::log!($severity, $($arg)+)
        }
    };
}

/// 条件成立时写入指定日志模块
#[macro_export]
macro_rules! mlog_if {
    ($module:expr, $severity:ident, $condition:expr, $($arg:tt)+) => {
        if $condition {
            $crate::mlog!($module, $severity, $($arg)+)
        }
    };
}

/// 只在 debug 构建中写入环境日志模块
#[macro_export]
macro_rules! dlog {
    ($severity:ident, $($arg:tt)+) => {
        $crate::log_if!($severity, cfg!(debug_assertions), $($arg)+)
    };
}

/// 环境日志模块打开 verbose 时写一条 INFO 记录
#[macro_export]
macro_rules! vlog {
    ($($arg:tt)+) => {
        $crate::log_if!(Info, __BASEX_LOG_MODULE.is_verbose(), $($arg)+)
    };
}

/// 条件不成立时写一条 FATAL 记录并终止进程
///
/// ```rust,no_run
/// use basex::check;
///
/// let fd = 3;
/// check!(fd >= 0);
/// check!(fd < 1024, "fd {} out of range", fd);
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr $(,)?) => {
        if !($condition) {
            $crate::logging::check::fail_check(
                file!(),
                line!(),
                format_args!("Check failed: {}", stringify!($condition)),
            );
        }
    };
    ($condition:expr, $($arg:tt)+) => {
        if !($condition) {
            $crate::logging::check::fail_check(
                file!(),
                line!(),
                format_args!("Check failed: {} {}", stringify!($condition), format_args!($($arg)+)),
            );
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_op {
    ($op:tt, $a:expr, $b:expr) => {
        match (&$a, &$b) {
            (__a, __b) => {
                if !(*__a $op *__b) {
                    $crate::logging::check::fail_check(
                        file!(),
                        line!(),
                        format_args!(
                            "Check failed: {}",
                            $crate::logging::check::check_op_message(
                                concat!(stringify!($a), " ", stringify!($op), " ", stringify!($b)),
                                __a,
                                __b,
                            )
                        ),
                    );
                }
            }
        }
    };
    ($op:tt, $a:expr, $b:expr, $($arg:tt)+) => {
        match (&$a, &$b) {
            (__a, __b) => {
                if !(*__a $op *__b) {
                    $crate::logging::check::fail_check(
                        file!(),
                        line!(),
                        format_args!(
                            "Check failed: {} {}",
                            $crate::logging::check::check_op_message(
                                concat!(stringify!($a), " ", stringify!($op), " ", stringify!($b)),
                                __a,
                                __b,
                            ),
                            format_args!($($arg)+)
                        ),
                    );
                }
            }
        }
    };
}

/// `a == b`，失败信息形如 `Check failed: a == b (1 vs. 2)`
#[macro_export]
macro_rules! check_eq {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(==, $a, $b $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! check_ne {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(!=, $a, $b $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! check_le {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(<=, $a, $b $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! check_lt {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(<, $a, $b $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! check_ge {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(>=, $a, $b $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! check_gt {
    ($a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_op!(>, $a, $b $(, $($arg)+)?)
    };
}

/// `Option` 为 `Some` 时返回其中的值，为 `None` 时写 FATAL 记录并终止进程
///
/// ```rust,no_run
/// use basex::check_notnull;
///
/// let port = check_notnull!(std::env::var("PORT").ok());
/// ```
#[macro_export]
macro_rules! check_notnull {
    ($value:expr $(,)?) => {
        match $value {
            ::std::option::Option::Some(__value) => __value,
            ::std::option::Option::None => $crate::logging::check::fail_check(
                file!(),
                line!(),
                format_args!("'{}' Must be non NULL", stringify!($value)),
            ),
        }
    };
}
