//! 同步原语
//!
//! 提供日志写入和目标表修改所需的互斥锁

mod lock;

pub use lock::{AutoLock, Lock};
