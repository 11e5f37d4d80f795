//! Employee availability slots
//!
//! A slot is a working window of one employee at one operation, either
//! weekly (`is_recurring`) or pinned to a `specific_date`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use shared::models::{AvailabilitySlot, AvailabilitySlotCreate, WeekDay};

use super::error::{SchedulingError, SchedulingResult};
use crate::utils::time;

fn slot_times(start: &str, end: &str) -> SchedulingResult<(NaiveTime, NaiveTime)> {
    let parse = |value: &str| {
        time::parse_hhmm(value)
            .ok_or_else(|| SchedulingError::Validation(format!("Invalid time '{value}', expected HH:MM")))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if start >= end {
        return Err(SchedulingError::Validation(
            "Slot start time must be before end time".to_string(),
        ));
    }
    Ok((start, end))
}

pub fn validate_slot(payload: &AvailabilitySlotCreate) -> SchedulingResult<()> {
    slot_times(&payload.start_time, &payload.end_time)?;
    match (payload.is_recurring, payload.specific_date) {
        (false, None) => Err(SchedulingError::Validation(
            "Non-recurring slot requires specific_date".to_string(),
        )),
        (false, Some(date)) if WeekDay::from(date.weekday()) != payload.day_of_week => {
            Err(SchedulingError::Validation(format!(
                "specific_date {date} is not a {:?}",
                payload.day_of_week
            )))
        }
        _ => Ok(()),
    }
}

/// Two slots of the same employee and operation collide.
///
/// Same weekday is required; two dated slots must also share the date.
pub fn slots_overlap(a: &AvailabilitySlot, b: &AvailabilitySlot) -> bool {
    if a.day_of_week != b.day_of_week {
        return false;
    }
    if !a.is_recurring && !b.is_recurring && a.specific_date != b.specific_date {
        return false;
    }
    let (Ok((a_start, a_end)), Ok((b_start, b_end))) = (
        slot_times(&a.start_time, &a.end_time),
        slot_times(&b.start_time, &b.end_time),
    ) else {
        return false;
    };
    !(a_end <= b_start || a_start >= b_end)
}

/// Slot is valid on `date` and spans `[start, end]` of that day
pub fn covers(slot: &AvailabilitySlot, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
    if !slot.is_active {
        return false;
    }
    let applies = if slot.is_recurring {
        WeekDay::from(date.weekday()) == slot.day_of_week
    } else {
        slot.specific_date == Some(date)
    };
    if !applies {
        return false;
    }
    match slot_times(&slot.start_time, &slot.end_time) {
        Ok((slot_start, slot_end)) => slot_start <= start && end <= slot_end,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: WeekDay, start: &str, end: &str) -> AvailabilitySlot {
        AvailabilitySlot {
            id: 1,
            employee_id: 2,
            operation_id: 3,
            day_of_week: day,
            start_time: start.into(),
            end_time: end.into(),
            is_recurring: true,
            specific_date: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_validate_slot() {
        let mut payload = AvailabilitySlotCreate {
            employee_id: 2,
            operation_id: 3,
            day_of_week: WeekDay::Monday,
            start_time: "08:00".into(),
            end_time: "12:00".into(),
            is_recurring: true,
            specific_date: None,
        };
        assert!(validate_slot(&payload).is_ok());

        payload.is_recurring = false;
        assert!(validate_slot(&payload).is_err());
        // 2025-06-02 is a Monday
        payload.specific_date = NaiveDate::from_ymd_opt(2025, 6, 2);
        assert!(validate_slot(&payload).is_ok());
        payload.specific_date = NaiveDate::from_ymd_opt(2025, 6, 3);
        assert!(validate_slot(&payload).is_err());

        payload.is_recurring = true;
        payload.end_time = "07:00".into();
        assert!(validate_slot(&payload).is_err());
    }

    #[test]
    fn test_slots_overlap() {
        let a = slot(WeekDay::Monday, "08:00", "12:00");
        assert!(slots_overlap(&a, &slot(WeekDay::Monday, "11:00", "13:00")));
        assert!(!slots_overlap(&a, &slot(WeekDay::Monday, "12:00", "13:00")));
        assert!(!slots_overlap(&a, &slot(WeekDay::Tuesday, "08:00", "12:00")));

        let mut d1 = slot(WeekDay::Monday, "08:00", "12:00");
        d1.is_recurring = false;
        d1.specific_date = NaiveDate::from_ymd_opt(2025, 6, 2);
        let mut d2 = d1.clone();
        d2.specific_date = NaiveDate::from_ymd_opt(2025, 6, 9);
        assert!(!slots_overlap(&d1, &d2));
        // a dated slot still collides with the weekly one
        assert!(slots_overlap(&a, &d1));
    }

    #[test]
    fn test_covers() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let s = slot(WeekDay::Monday, "08:00", "12:00");
        assert!(covers(&s, monday, hm(8, 0), hm(12, 0)));
        assert!(covers(&s, monday, hm(9, 0), hm(10, 0)));
        assert!(!covers(&s, monday, hm(11, 0), hm(12, 30)));
        assert!(!covers(&s, monday.succ_opt().unwrap(), hm(9, 0), hm(10, 0)));

        let mut inactive = s.clone();
        inactive.is_active = false;
        assert!(!covers(&inactive, monday, hm(9, 0), hm(10, 0)));
    }
}
