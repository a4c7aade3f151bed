use std::fmt::{self, Debug, Write as _};

use crate::logging::{LogContext, LogMessage, Severity};

/// 比较断言失败时的描述：`a == b (1 vs. 2)`
pub fn check_op_message<A, B>(expr: &str, a: &A, b: &B) -> String
where
    A: Debug + ?Sized,
    B: Debug + ?Sized,
{
    format!("{} ({:?} vs. {:?})", expr, a, b)
}

/// 断言失败：在全局上下文的内部模块上写一条 FATAL 记录，然后调用失败函数
#[doc(hidden)]
pub fn fail_check(file: &str, line: u32, message: fmt::Arguments<'_>) -> ! {
    let context = LogContext::global();
    let mut record = LogMessage::new(
        context,
        context.internal_module(),
        file,
        line,
        Severity::Fatal,
    );
    let _ = record.write_fmt(message);
    record.fail()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_op_message() {
        assert_eq!(check_op_message("a == b", &1, &2), "a == b (1 vs. 2)");
        assert_eq!(
            check_op_message("name != \"x\"", "x", "x"),
            "name != \"x\" (\"x\" vs. \"x\")"
        );
    }
}
