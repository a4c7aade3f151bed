use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const MILLISECONDS_PER_SECOND: i64 = 1000;
pub const MICROSECONDS_PER_MILLISECOND: i64 = 1000;
pub const MICROSECONDS_PER_SECOND: i64 = MICROSECONDS_PER_MILLISECOND * MILLISECONDS_PER_SECOND;
pub const MICROSECONDS_PER_MINUTE: i64 = MICROSECONDS_PER_SECOND * 60;
pub const MICROSECONDS_PER_HOUR: i64 = MICROSECONDS_PER_MINUTE * 60;
pub const MICROSECONDS_PER_DAY: i64 = MICROSECONDS_PER_HOUR * 24;

/// 时间间隔，微秒精度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeDelta {
    delta_us: i64,
}

impl TimeDelta {
    pub const fn from_microseconds(us: i64) -> Self {
        Self { delta_us: us }
    }

    pub const fn from_milliseconds(ms: i64) -> Self {
        Self::from_microseconds(ms.saturating_mul(MICROSECONDS_PER_MILLISECOND))
    }

    pub const fn from_seconds(secs: i64) -> Self {
        Self::from_microseconds(secs.saturating_mul(MICROSECONDS_PER_SECOND))
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self::from_microseconds(minutes.saturating_mul(MICROSECONDS_PER_MINUTE))
    }

    pub const fn from_hours(hours: i64) -> Self {
        Self::from_microseconds(hours.saturating_mul(MICROSECONDS_PER_HOUR))
    }

    pub const fn from_days(days: i64) -> Self {
        Self::from_microseconds(days.saturating_mul(MICROSECONDS_PER_DAY))
    }

    /// 无穷大间隔，`in_*` 系列方法对它返回 `i64::MAX`
    pub const fn max() -> Self {
        Self::from_microseconds(i64::MAX)
    }

    pub const fn is_max(&self) -> bool {
        self.delta_us == i64::MAX
    }

    pub fn in_days(&self) -> i64 {
        self.in_units(MICROSECONDS_PER_DAY)
    }

    pub fn in_hours(&self) -> i64 {
        self.in_units(MICROSECONDS_PER_HOUR)
    }

    pub fn in_minutes(&self) -> i64 {
        self.in_units(MICROSECONDS_PER_MINUTE)
    }

    pub fn in_seconds(&self) -> i64 {
        self.in_units(MICROSECONDS_PER_SECOND)
    }

    pub fn in_milliseconds(&self) -> i64 {
        self.in_units(MICROSECONDS_PER_MILLISECOND)
    }

    pub fn in_microseconds(&self) -> i64 {
        self.delta_us
    }

    fn in_units(&self, unit: i64) -> i64 {
        if self.is_max() {
            i64::MAX
        } else {
            self.delta_us / unit
        }
    }
}

impl From<Duration> for TimeDelta {
    fn from(d: Duration) -> Self {
        Self::from_microseconds(i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
    }
}

impl Add for TimeDelta {
    type Output = TimeDelta;

    fn add(self, other: TimeDelta) -> TimeDelta {
        TimeDelta::from_microseconds(self.delta_us.saturating_add(other.delta_us))
    }
}

impl Sub for TimeDelta {
    type Output = TimeDelta;

    fn sub(self, other: TimeDelta) -> TimeDelta {
        TimeDelta::from_microseconds(self.delta_us.saturating_sub(other.delta_us))
    }
}

impl AddAssign for TimeDelta {
    fn add_assign(&mut self, other: TimeDelta) {
        *self = *self + other;
    }
}

impl SubAssign for TimeDelta {
    fn sub_assign(&mut self, other: TimeDelta) {
        *self = *self - other;
    }
}

/// 分解后的日历时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exploded {
    /// 四位年份，如 2007
    pub year: i32,
    /// 从 1 开始的月份
    pub month: u32,
    /// 从 0 开始的星期，0 表示周日
    pub day_of_week: u32,
    /// 从 1 开始的日
    pub day_of_month: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    /// 秒内的微秒数（0-999999）
    pub microsecond: u32,
}

impl Exploded {
    fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        // 闰秒时 chrono 的纳秒可能超过 1e9，截断到当前秒内
        let micros = (dt.nanosecond() / 1000).min(999_999);
        Self {
            year: dt.year(),
            month: dt.month(),
            day_of_week: dt.weekday().num_days_from_sunday(),
            day_of_month: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            millisecond: micros / 1000,
            microsecond: micros,
        }
    }
}

/// 墙钟时间点
///
/// 内部值为 Unix 纪元以来的微秒数，0 表示空时间
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    us: i64,
}

impl Time {
    /// 当前墙钟时间
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub const fn unix_epoch() -> Self {
        Self { us: 0 }
    }

    pub const fn max() -> Self {
        Self { us: i64::MAX }
    }

    pub const fn from_internal_value(us: i64) -> Self {
        Self { us }
    }

    pub const fn to_internal_value(&self) -> i64 {
        self.us
    }

    pub const fn is_null(&self) -> bool {
        self.us == 0
    }

    pub const fn is_max(&self) -> bool {
        self.us == i64::MAX
    }

    pub fn from_system_time(t: SystemTime) -> Self {
        let us = match t.duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_micros()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_micros()).unwrap_or(i64::MAX),
        };
        Self { us }
    }

    pub fn from_time_t(secs: i64) -> Self {
        Self {
            us: secs.saturating_mul(MICROSECONDS_PER_SECOND),
        }
    }

    /// 向负无穷取整到秒
    pub fn to_time_t(&self) -> i64 {
        self.us.div_euclid(MICROSECONDS_PER_SECOND)
    }

    /// 秒内的微秒部分
    pub fn subsec_micros(&self) -> u32 {
        self.us.rem_euclid(MICROSECONDS_PER_SECOND) as u32
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.to_time_t(), self.subsec_micros() * 1000)
            .unwrap_or_default()
    }

    pub fn to_local(&self) -> DateTime<Local> {
        self.to_utc().with_timezone(&Local)
    }

    pub fn local_explode(&self) -> Exploded {
        Exploded::from_datetime(&self.to_local())
    }

    pub fn utc_explode(&self) -> Exploded {
        Exploded::from_datetime(&self.to_utc())
    }

    /// RFC 3339 格式的 UTC 字符串，微秒精度
    pub fn to_utc_string(&self) -> String {
        self.to_utc()
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
    }

    /// 解析 RFC 3339 时间字符串，格式错误返回 `None`
    pub fn from_utc_string(s: &str) -> Option<Self> {
        let dt = DateTime::parse_from_rfc3339(s).ok()?;
        Some(Self {
            us: dt.timestamp_micros(),
        })
    }
}

impl Add<TimeDelta> for Time {
    type Output = Time;

    fn add(self, delta: TimeDelta) -> Time {
        if delta.is_max() {
            return Time::max();
        }
        Time {
            us: self.us.saturating_add(delta.in_microseconds()),
        }
    }
}

impl Sub<TimeDelta> for Time {
    type Output = Time;

    fn sub(self, delta: TimeDelta) -> Time {
        Time {
            us: self.us.saturating_sub(delta.in_microseconds()),
        }
    }
}

impl Sub for Time {
    type Output = TimeDelta;

    fn sub(self, other: Time) -> TimeDelta {
        TimeDelta::from_microseconds(self.us.saturating_sub(other.us))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_utc_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_delta_units() {
        let delta = TimeDelta::from_days(2);
        assert_eq!(delta.in_days(), 2);
        assert_eq!(delta.in_hours(), 48);
        assert_eq!(delta.in_minutes(), 48 * 60);
        assert_eq!(TimeDelta::from_seconds(3).in_milliseconds(), 3000);
        assert_eq!(TimeDelta::max().in_hours(), i64::MAX);
        assert!(TimeDelta::from_minutes(1) > TimeDelta::from_seconds(59));
    }

    #[test]
    fn test_time_delta_arithmetic() {
        let mut delta = TimeDelta::from_hours(1);
        delta += TimeDelta::from_minutes(30);
        assert_eq!(delta.in_minutes(), 90);
        delta -= TimeDelta::from_hours(1);
        assert_eq!(delta.in_minutes(), 30);
        assert_eq!(TimeDelta::from(Duration::from_millis(1500)).in_milliseconds(), 1500);
    }

    #[test]
    fn test_time_arithmetic() {
        let t = Time::from_time_t(1_000);
        let later = t + TimeDelta::from_seconds(30);
        assert_eq!(later.to_time_t(), 1_030);
        assert_eq!((later - t).in_seconds(), 30);
        assert_eq!((later - TimeDelta::from_seconds(30)), t);
        assert!((t + TimeDelta::max()).is_max());
    }

    #[test]
    fn test_utc_explode() {
        // 2014-03-15 12:34:56.789012 UTC
        let t = Time::from_internal_value(1_394_886_896_789_012);
        let e = t.utc_explode();
        assert_eq!(e.year, 2014);
        assert_eq!(e.month, 3);
        assert_eq!(e.day_of_month, 15);
        assert_eq!(e.day_of_week, 6);
        assert_eq!(e.hour, 12);
        assert_eq!(e.minute, 34);
        assert_eq!(e.second, 56);
        assert_eq!(e.millisecond, 789);
        assert_eq!(e.microsecond, 789_012);
    }

    #[test]
    fn test_utc_string_round_trip() {
        let t = Time::from_internal_value(1_394_886_896_789_012);
        let s = t.to_utc_string();
        assert_eq!(s, "2014-03-15T12:34:56.789012Z");
        assert_eq!(Time::from_utc_string(&s), Some(t));
        assert_eq!(Time::from_utc_string("not a time"), None);
    }

    #[test]
    fn test_negative_time_t_rounds_down() {
        let t = Time::from_internal_value(-1);
        assert_eq!(t.to_time_t(), -1);
        assert_eq!(t.subsec_micros(), 999_999);
    }

    #[test]
    fn test_now_is_after_epoch() {
        let now = Time::now();
        assert!(now > Time::unix_epoch());
        assert!(!now.is_null());
    }
}
