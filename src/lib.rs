//! basex - 基础库
//!
//! 按模块组织的同步日志引擎，以及它依赖的基础设施。
//!
//! ## 模块
//!
//! - **logging**: 日志模块（模块路由、有界记录缓冲、文件/标准错误目标、断言宏）
//! - **cfg**: 按类型名称从配置创建 trait object 的注册表
//! - **sync**: 互斥锁与作用域锁
//! - **time**: 微秒精度的时间、时间间隔和时间源
//! - **strings**: 数字与字符串的相互转换

pub mod cfg;
pub mod logging;
pub mod strings;
pub mod sync;
pub mod time;

// 重新导出主要的公共 API
pub use cfg::{create_trait_from_type_options, register_trait, TypeOptions};

pub use logging::{
    LogConfig, LogContext, LogDestination, LogError, LogMessage, LogModule, LogOptions, Severity,
};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
