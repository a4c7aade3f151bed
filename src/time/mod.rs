//! 时间模块
//!
//! 微秒精度的墙钟时间与时间间隔，以及可替换的时间源

mod clock;
#[allow(clippy::module_inception)]
mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use time::{
    Exploded, Time, TimeDelta, MICROSECONDS_PER_DAY, MICROSECONDS_PER_HOUR,
    MICROSECONDS_PER_MILLISECOND, MICROSECONDS_PER_MINUTE, MICROSECONDS_PER_SECOND,
    MILLISECONDS_PER_SECOND,
};
