use thiserror::Error;

/// 日志配置错误
///
/// 只在配置阶段返回；写日志的路径上不会产生任何错误
#[derive(Error, Debug)]
pub enum LogError {
    #[error("未注册的日志模块: {0}")]
    UnknownModule(String),

    #[error("无效的日志级别: {0}")]
    InvalidSeverity(String),

    #[error("日志目标创建失败: {0}")]
    Destination(#[from] anyhow::Error),
}

impl From<std::convert::Infallible> for LogError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
