//! 日志模块
//!
//! 按模块组织的同步日志引擎。每个日志模块有自己的最低级别、字节配额和
//! 级别 × 目标类型 的路由表；一条记录在构造时写好固定前缀，析构时分发到
//! 模块在该级别绑定的所有目标。
//!
//! # 特性
//!
//! - 四个级别：Info, Warning, Error, Fatal，Fatal 刷新后终止进程
//! - 前缀格式：`I0315 12:34:56:789012 12345 main.rs:42] `
//! - 文件目标：延迟创建、字节阈值和时间间隔两种刷新策略、文件大小上限
//! - 单条记录缓冲区有上限，超出部分截断
//! - 写日志的路径上没有任何错误返回
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use basex::logging::{LogConfig, LogContext};
//! use basex::{define_log_module, log};
//!
//! define_log_module!(app);
//!
//! fn main() -> anyhow::Result<()> {
//!     let config: LogConfig = json5::from_str(r#"
//!         {
//!             modules: {
//!                 app: {
//!                     destinations: [
//!                         {
//!                             severity: "info",
//!                             destination: {
//!                                 type: "FileDestination",
//!                                 options: { file_path: "/tmp/app.log" },
//!                             },
//!                         },
//!                     ],
//!                 },
//!             },
//!         }
//!     "#)?;
//!     LogContext::global().configure(&config)?;
//!
//!     log!(Info, "application started");
//!     LogContext::global().flush_all();
//!     Ok(())
//! }
//! ```

pub mod check;
mod config;
mod context;
pub mod destination;
mod error;
pub mod macros;
mod message;
mod module;
mod os;
mod severity;
mod utilities;

pub use config::{
    DestinationBinding, LogConfig, LogOptions, ModuleConfig, DEFAULT_MAX_MESSAGE_LEN,
    MAX_MESSAGE_LEN_LIMIT,
};
pub use context::{FailureFunction, LogContext, INTERNAL_MODULE_NAME};
pub use destination::{
    create_destination_from_options, register_destinations, DestinationKind, FileDestination,
    FileDestinationConfig, LogDestination, StderrDestination, StderrDestinationConfig,
};
pub use error::{LogError, Result};
pub use message::LogMessage;
pub use module::LogModule;
pub use severity::Severity;
pub use utilities::{init_logging_utilities, program_pid, program_short_name};
