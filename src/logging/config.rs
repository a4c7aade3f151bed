use serde::Deserialize;
use smart_default::SmartDefault;
use std::collections::HashMap;

use crate::cfg::TypeOptions;
use crate::logging::Severity;

/// 单条记录缓冲区的默认容量
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 30000;

/// `max_message_len` 的上限，更大的值按上限处理
pub const MAX_MESSAGE_LEN_LIMIT: usize = 16 * 1024 * 1024;

/// 日志上下文的运行参数
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LogOptions {
    /// 单条记录最大字节数（含前缀），超出部分被截断，不超过 [`MAX_MESSAGE_LEN_LIMIT`]
    #[default(DEFAULT_MAX_MESSAGE_LEN)]
    pub max_message_len: usize,

    /// 不低于该级别的记录写出时强制刷新目标
    #[default(Severity::Error)]
    pub force_flush_severity: Severity,

    /// 通过 `add_file_destination` 创建的文件目标的刷新间隔（秒）
    #[default(30)]
    pub flush_interval_secs: u64,
}

impl LogOptions {
    /// 把超出范围的参数收敛到上限
    pub(crate) fn clamped(mut self) -> Self {
        self.max_message_len = self.max_message_len.min(MAX_MESSAGE_LEN_LIMIT);
        self
    }
}

/// 目标绑定
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DestinationBinding {
    /// 绑定到不低于该级别的所有级别
    pub severity: Severity,

    /// 目标配置，例如 `{ type: "FileDestination", options: { file_path: "..." } }`
    pub destination: TypeOptions,
}

/// 模块配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct ModuleConfig {
    #[default(Severity::Info)]
    pub min_severity: Severity,

    #[default(true)]
    pub verbose: bool,

    /// 模块累计字节配额
    #[default(u64::MAX)]
    pub max_bytes: u64,

    pub destinations: Vec<DestinationBinding>,
}

/// 日志配置
///
/// # 示例
///
/// ```rust
/// use basex::logging::LogConfig;
///
/// let config: LogConfig = json5::from_str(r#"
///     {
///         options: { flush_interval_secs: 5 },
///         modules: {
///             net: {
///                 min_severity: "warning",
///                 destinations: [
///                     { severity: "warning", destination: { type: "StderrDestination" } },
///                 ],
///             },
///         },
///     }
/// "#).unwrap();
/// assert_eq!(config.options.flush_interval_secs, 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub options: LogOptions,
    pub modules: HashMap<String, ModuleConfig>,
}
