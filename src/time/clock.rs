use crate::sync::Lock;
use crate::time::{Time, TimeDelta};

/// 时间源
///
/// 日志记录的时间戳和文件目标的定时刷新都从这里取时间，
/// 测试中可以替换为 [`ManualClock`]
pub trait Clock: Send + Sync {
    fn now(&self) -> Time;
}

/// 系统墙钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Time::now()
    }
}

/// 手动推进的时钟
#[derive(Debug)]
pub struct ManualClock {
    now: Lock<Time>,
}

impl ManualClock {
    pub fn new(start: Time) -> Self {
        Self {
            now: Lock::new(start),
        }
    }

    pub fn set(&self, t: Time) {
        *self.now.acquire() = t;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.acquire();
        *now = *now + delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Time::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        *self.now.acquire()
    }
}
