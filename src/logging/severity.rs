use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::logging::error::LogError;

/// 日志级别
///
/// 按紧急程度全序，`Fatal` 记录写出后进程一定终止
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// 一般信息
    #[default]
    Info = 0,
    /// 警告信息
    Warning = 1,
    /// 错误信息
    Error = 2,
    /// 致命错误，记录后终止进程
    Fatal = 3,
}

impl Severity {
    /// 级别个数，用作目标表的第一维
    pub const COUNT: usize = 4;

    pub const ALL: [Severity; Severity::COUNT] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// 日志前缀中的单字母代码
    pub const fn code(self) -> char {
        match self {
            Severity::Info => 'I',
            Severity::Warning => 'W',
            Severity::Error => 'E',
            Severity::Fatal => 'F',
        }
    }

    pub(crate) fn from_index(index: u8) -> Severity {
        match index {
            0 => Severity::Info,
            1 => Severity::Warning,
            2 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(LogError::InvalidSeverity(s.to_string())),
        }
    }
}

impl TryFrom<&str> for Severity {
    type Error = LogError;

    fn try_from(s: &str) -> Result<Self, LogError> {
        s.parse()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from_str("info").unwrap(), Severity::Info);
        assert_eq!(Severity::from_str("WARNING").unwrap(), Severity::Warning);
        assert_eq!(Severity::from_str("Warn").unwrap(), Severity::Warning);
        assert_eq!(Severity::from_str("error").unwrap(), Severity::Error);
        assert_eq!(Severity::from_str("FATAL").unwrap(), Severity::Fatal);
    }

    #[test]
    fn test_severity_from_str_invalid() {
        assert!(matches!(
            Severity::from_str("debug"),
            Err(LogError::InvalidSeverity(s)) if s == "debug"
        ));
    }

    #[test]
    fn test_severity_display_and_code() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Error.to_string(), "ERROR");
        assert_eq!(Severity::Fatal.to_string(), "FATAL");

        let codes: String = Severity::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, "IWEF");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        for s in Severity::ALL {
            assert_eq!(Severity::from_index(s.index() as u8), s);
        }
    }

    #[test]
    fn test_severity_serde() {
        let s: Severity = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(s, Severity::Warning);
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), r#""ERROR""#);
        assert!(serde_json::from_str::<Severity>(r#""verbose""#).is_err());
    }

    #[test]
    fn test_severity_try_from() {
        assert_eq!(Severity::try_from("ERROR").unwrap(), Severity::Error);
        assert!(matches!(
            Severity::try_from("trace"),
            Err(LogError::InvalidSeverity(s)) if s == "trace"
        ));
    }
}
