//! 时间工具函数：业务时区转换
//!
//! 存储层只接收 `i64` Unix millis (UTC)，
//! 营业时间、周期预约、统计按业务时区计算。

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// 解析时间字符串 (HH:MM)
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Unix millis → 业务时区时间
pub fn to_local(millis: i64, tz: Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(millis).single()
}

/// Unix millis → 业务时区日期
pub fn local_date(millis: i64, tz: Tz) -> Option<NaiveDate> {
    to_local(millis, tz).map(|dt| dt.date_naive())
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期 + 当天分钟偏移 → Unix millis (业务时区)
pub fn date_minutes_to_millis(date: NaiveDate, minutes: u32, tz: Tz) -> i64 {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(minutes.min(1439) * 60, 0)
        .unwrap_or(NaiveTime::MIN);
    date_time_to_millis(date, time, tz)
}

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}
