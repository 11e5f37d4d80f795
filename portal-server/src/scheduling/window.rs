//! 营业时间校验
//!
//! Pure checks on an appointment interval: ordering, minimum duration and
//! operation business hours. Time-of-day is read in the business timezone.

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;
use shared::models::Operation;

use super::error::{SchedulingError, SchedulingResult};
use crate::utils::time;

/// Hours are compared at minute precision; seconds are dropped
fn to_minute(t: NaiveTime) -> NaiveTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// One hour
pub const MIN_DURATION_MILLIS: i64 = 60 * 60 * 1000;

/// Operation opening hours, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

impl BusinessHours {
    pub fn new(opening: NaiveTime, closing: NaiveTime) -> Self {
        Self { opening, closing }
    }

    pub fn from_operation(operation: &Operation) -> SchedulingResult<Self> {
        let parse = |value: &str, field: &str| {
            time::parse_hhmm(value).ok_or_else(|| {
                SchedulingError::Validation(format!(
                    "Operation {} has invalid {field} '{value}'",
                    operation.id
                ))
            })
        };
        let hours = Self::new(
            parse(&operation.opening_time, "opening_time")?,
            parse(&operation.closing_time, "closing_time")?,
        );
        if hours.opening >= hours.closing {
            return Err(SchedulingError::Validation(format!(
                "Operation {} closes before it opens",
                operation.id
            )));
        }
        Ok(hours)
    }

    fn out_of_hours(&self) -> SchedulingError {
        SchedulingError::OutOfHours {
            opening: self.opening,
            closing: self.closing,
        }
    }
}

/// `start < end` and at least one hour long
pub fn validate_range(start: i64, end: i64) -> SchedulingResult<()> {
    if start >= end {
        return Err(SchedulingError::InvalidRange { start, end });
    }
    if end - start < MIN_DURATION_MILLIS {
        return Err(SchedulingError::InvalidDuration {
            minutes: (end - start) / 60_000,
            min_minutes: MIN_DURATION_MILLIS / 60_000,
        });
    }
    Ok(())
}

/// Full window check: range, duration, then business hours.
///
/// The interval must sit on a single local calendar day with
/// `opening <= start` and `end <= closing`.
pub fn validate_window(start: i64, end: i64, hours: &BusinessHours, tz: Tz) -> SchedulingResult<()> {
    validate_range(start, end)?;

    let (Some(local_start), Some(local_end)) = (time::to_local(start, tz), time::to_local(end, tz))
    else {
        return Err(hours.out_of_hours());
    };

    if local_start.date_naive() != local_end.date_naive() {
        return Err(hours.out_of_hours());
    }
    if to_minute(local_start.time()) < hours.opening || to_minute(local_end.time()) > hours.closing {
        return Err(hours.out_of_hours());
    }
    Ok(())
}
