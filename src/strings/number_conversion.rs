use std::fmt::{Display, Write};
use std::str::FromStr;

/// 数字转十进制字符串
pub fn number_to_string<T: Display>(value: T) -> String {
    value.to_string()
}

/// 浮点数转字符串，使用能够精确还原的最短表示
pub fn double_to_string(value: f64) -> String {
    format!("{:?}", value)
}

/// 十进制字符串转数字
///
/// 整个字符串必须是合法数字，前后空白、尾随字符和溢出都返回 `None`
pub fn string_to_number<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return None;
    }
    s.parse().ok()
}

/// 字节转大写十六进制字符串
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // 写入 String 不会失败
        let _ = write!(out, "{:02X}", b);
    }
    out
}

/// 十六进制字符串转 i64，允许 `0x`/`0X` 前缀和负号
pub fn hex_string_to_i64(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits = strip_hex_prefix(digits);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, 16).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// 十六进制字符串转 u64，允许 `0x`/`0X` 前缀
pub fn hex_string_to_u64(s: &str) -> Option<u64> {
    let digits = strip_hex_prefix(s.strip_prefix('+').unwrap_or(s));
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
