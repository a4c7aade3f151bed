//! 进程级测试：FATAL 记录、断言宏和正常退出时的刷新
//!
//! 每个测试重新执行当前测试程序，只运行自己，子进程通过环境变量区分

use anyhow::Result;
use basex::logging::{LogContext, Severity};
use basex::{check_eq, check_notnull, mlog};
use std::env;
use std::fs;
use std::process::{Command, Output};

const CHILD_ENV: &str = "BASEX_FATAL_CHILD";
const LOG_PATH_ENV: &str = "BASEX_FATAL_LOG_PATH";

fn run_child(test_name: &str, log_path: &str) -> Result<Output> {
    Ok(Command::new(env::current_exe()?)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, test_name)
        .env(LOG_PATH_ENV, log_path)
        .output()?)
}

fn is_child(test_name: &str) -> bool {
    env::var(CHILD_ENV).map_or(false, |name| name == test_name)
}

#[cfg(unix)]
fn assert_aborted(output: &Output) {
    use std::os::unix::process::ExitStatusExt;
    assert_eq!(output.status.signal(), Some(libc::SIGABRT), "{:?}", output);
}

#[cfg(not(unix))]
fn assert_aborted(output: &Output) {
    assert!(!output.status.success(), "{:?}", output);
}

#[test]
fn test_fatal_record_flushed_before_abort() -> Result<()> {
    let name = "test_fatal_record_flushed_before_abort";
    if is_child(name) {
        let context = LogContext::global();
        context.add_file_destination("fatal", Severity::Info, &env::var(LOG_PATH_ENV)?)?;
        let module = context.module("fatal");
        mlog!(module, Info, "before the end");
        mlog!(module, Fatal, "the end {}", 42);
        unreachable!("fatal record must terminate the process");
    }

    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("fatal.log");
    let output = run_child(name, path.to_str().unwrap())?;
    assert_aborted(&output);

    let content = fs::read_to_string(&path)?;
    assert!(content.contains("before the end"));
    let last = content.lines().last().unwrap();
    assert!(last.starts_with('F'), "{}", last);
    assert!(last.contains(" test_fatal.rs:"), "{}", last);
    assert!(last.ends_with("] the end 42"), "{}", last);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_buffered_records_flushed_at_exit() -> Result<()> {
    let name = "test_buffered_records_flushed_at_exit";
    if is_child(name) {
        let context = LogContext::global();
        context.add_file_destination("exit", Severity::Info, &env::var(LOG_PATH_ENV)?)?;
        let module = context.module("exit");
        mlog!(module, Info, "buffered until exit");
        std::process::exit(0);
    }

    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("exit.log");
    let output = run_child(name, path.to_str().unwrap())?;
    assert!(output.status.success(), "{:?}", output);

    let content = fs::read_to_string(&path)?;
    let last = content.lines().last().unwrap();
    assert!(last.starts_with('I'), "{}", last);
    assert!(last.ends_with("] buffered until exit"), "{}", last);
    Ok(())
}

#[test]
fn test_check_eq_failure_message() -> Result<()> {
    let name = "test_check_eq_failure_message";
    if is_child(name) {
        let value = 1 + 1;
        check_eq!(value, 3, "arithmetic is {}", "broken");
        unreachable!("check failure must terminate the process");
    }

    let output = run_child(name, "")?;
    assert_aborted(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("] Check failed: value == 3 (2 vs. 3) arithmetic is broken"),
        "{}",
        stderr
    );
    Ok(())
}

#[test]
fn test_check_notnull_failure_message() -> Result<()> {
    let name = "test_check_notnull_failure_message";
    if is_child(name) {
        let missing: Option<u32> = None;
        let _ = check_notnull!(missing);
        unreachable!("check failure must terminate the process");
    }

    let output = run_child(name, "")?;
    assert_aborted(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'missing' Must be non NULL"), "{}", stderr);
    Ok(())
}
