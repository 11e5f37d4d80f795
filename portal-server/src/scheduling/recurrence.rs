//! 周期预约展开
//!
//! Expands a [`RecurringTemplate`] into concrete occurrences. Expansion is a
//! pure function of the template: calling it twice yields the same sequence.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use shared::models::{
    Appointment, AppointmentStatus, RecurrencePattern, RecurringTemplate, WeekDay,
};

use super::error::{SchedulingError, SchedulingResult};
use crate::utils::time;

pub const MIN_TEMPLATE_DURATION_MINUTES: u32 = 30;
pub const MAX_TEMPLATE_DURATION_MINUTES: u32 = 480;

/// Bounds applied when the template leaves them open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Cap when `max_occurrences` is unset
    pub max_occurrences: u32,
    /// End bound in years when `end_date` is unset
    pub horizon_years: u32,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_occurrences: 1000,
            horizon_years: 10,
        }
    }
}

/// Structural validation of a template
pub fn validate_template(t: &RecurringTemplate) -> SchedulingResult<()> {
    let invalid = |msg: &str| Err(SchedulingError::InvalidRecurrence(msg.to_string()));

    if t.supplier_id == 0 || t.employee_id == 0 || t.operation_id == 0 || t.product_id == 0 {
        return invalid("supplier, employee, operation and product are required");
    }
    if t.quantity_to_deliver <= 0 {
        return Err(SchedulingError::InvalidQuantity(t.quantity_to_deliver));
    }
    match (t.end_date, t.max_occurrences) {
        (Some(_), Some(_)) => return invalid("set either end_date or max_occurrences, not both"),
        (None, None) => return invalid("either end_date or max_occurrences is required"),
        (None, Some(0)) => return invalid("max_occurrences must be greater than zero"),
        (Some(end), None) if end <= t.start_date => {
            return invalid("end_date must be after start_date");
        }
        _ => {}
    }
    if !(MIN_TEMPLATE_DURATION_MINUTES..=MAX_TEMPLATE_DURATION_MINUTES).contains(&t.duration_minutes)
    {
        return invalid("duration_minutes must be between 30 and 480");
    }
    if t.start_time_minutes > 1439 {
        return invalid("start_time_minutes must be between 0 and 1439");
    }
    match t.pattern {
        RecurrencePattern::Weekly | RecurrencePattern::Biweekly if t.week_days.is_empty() => {
            return invalid("weekly and biweekly patterns need at least one weekday");
        }
        RecurrencePattern::Monthly if !matches!(t.month_day, Some(1..=31)) => {
            return invalid("monthly pattern needs month_day between 1 and 31");
        }
        _ => {}
    }
    Ok(())
}

fn includes(t: &RecurringTemplate, day: NaiveDate) -> bool {
    let weekday = WeekDay::from(day.weekday());
    match t.pattern {
        RecurrencePattern::Daily => true,
        RecurrencePattern::Weekly => t.week_days.contains(&weekday),
        RecurrencePattern::Biweekly => {
            let weeks = (day - t.start_date).num_days() / 7;
            weeks % 2 == 0 && t.week_days.contains(&weekday)
        }
        RecurrencePattern::Monthly => t.month_day == Some(day.day()),
    }
}

/// First day past the expansion window (exclusive)
fn end_bound(t: &RecurringTemplate, limits: &ExpansionLimits) -> NaiveDate {
    t.end_date.unwrap_or_else(|| {
        t.start_date
            .checked_add_months(Months::new(limits.horizon_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Local start date-times of every occurrence, in order.
///
/// Walks day by day from `start_date` to the end bound, keeps days matching
/// the pattern, drops excluded dates, stops after the occurrence cap.
pub fn generate_occurrences(
    t: &RecurringTemplate,
    limits: &ExpansionLimits,
) -> Vec<NaiveDateTime> {
    let cap = t.max_occurrences.unwrap_or(limits.max_occurrences) as usize;
    let last = end_bound(t, limits);
    let offset = NaiveTime::from_num_seconds_from_midnight_opt(t.start_time_minutes.min(1439) * 60, 0)
        .unwrap_or(NaiveTime::MIN);

    let mut occurrences = Vec::new();
    let mut day = t.start_date;
    while day < last && occurrences.len() < cap {
        if includes(t, day) && !t.exclusion_dates.contains(&day) {
            occurrences.push(day.and_time(offset));
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    occurrences
}

/// Concrete pending appointments for every occurrence.
///
/// Neither persisted nor conflict-checked. `next_id` supplies ids.
pub fn generate_appointments(
    t: &RecurringTemplate,
    limits: &ExpansionLimits,
    tz: Tz,
    now: i64,
    mut next_id: impl FnMut() -> i64,
) -> Vec<Appointment> {
    let duration = i64::from(t.duration_minutes) * 60_000;
    generate_occurrences(t, limits)
        .into_iter()
        .map(|local| {
            let start = time::date_minutes_to_millis(local.date(), t.start_time_minutes, tz);
            Appointment {
                id: next_id(),
                supplier_id: t.supplier_id,
                employee_id: t.employee_id,
                operation_id: t.operation_id,
                product_id: t.product_id,
                scheduled_start: start,
                scheduled_end: start + duration,
                status: AppointmentStatus::Pending,
                quantity_to_deliver: t.quantity_to_deliver,
                notes: t.notes.clone(),
                cancellation_reason: None,
                confirmed_at: None,
                cancelled_at: None,
                completed_at: None,
                recurring_template_id: Some(t.id),
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(pattern: RecurrencePattern) -> RecurringTemplate {
        RecurringTemplate {
            id: 500,
            supplier_id: 1,
            employee_id: 2,
            operation_id: 3,
            product_id: 4,
            quantity_to_deliver: 10,
            notes: Some("pallets".into()),
            pattern,
            start_date: ymd(2025, 6, 1),
            end_date: None,
            max_occurrences: Some(4),
            start_time_minutes: 9 * 60,
            duration_minutes: 60,
            week_days: vec![],
            month_day: None,
            exclusion_dates: vec![],
            materialized_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn dates(occurrences: &[NaiveDateTime]) -> Vec<NaiveDate> {
        occurrences.iter().map(|o| o.date()).collect()
    }

    #[test]
    fn test_weekly_monday_wednesday() {
        let mut t = template(RecurrencePattern::Weekly);
        t.week_days = vec![WeekDay::Monday, WeekDay::Wednesday];

        let occ = generate_occurrences(&t, &ExpansionLimits::default());
        assert_eq!(
            dates(&occ),
            vec![
                ymd(2025, 6, 2),
                ymd(2025, 6, 4),
                ymd(2025, 6, 9),
                ymd(2025, 6, 11)
            ]
        );
        assert!(
            occ.iter()
                .all(|o| o.time() == NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_exclusion_removes_exactly_one() {
        let mut t = template(RecurrencePattern::Weekly);
        t.week_days = vec![WeekDay::Monday, WeekDay::Wednesday];
        t.max_occurrences = None;
        t.end_date = Some(ymd(2025, 6, 30));

        let before = dates(&generate_occurrences(&t, &ExpansionLimits::default()));
        t.exclusion_dates = vec![ymd(2025, 6, 11)];
        let after = dates(&generate_occurrences(&t, &ExpansionLimits::default()));

        assert_eq!(after.len(), before.len() - 1);
        let expected: Vec<_> = before
            .into_iter()
            .filter(|d| *d != ymd(2025, 6, 11))
            .collect();
        assert_eq!(after, expected);
    }

    #[test]
    fn test_excluded_dates_do_not_count_toward_cap() {
        let mut t = template(RecurrencePattern::Daily);
        t.exclusion_dates = vec![ymd(2025, 6, 2)];
        let occ = dates(&generate_occurrences(&t, &ExpansionLimits::default()));
        assert_eq!(
            occ,
            vec![
                ymd(2025, 6, 1),
                ymd(2025, 6, 3),
                ymd(2025, 6, 4),
                ymd(2025, 6, 5)
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let mut t = template(RecurrencePattern::Biweekly);
        t.week_days = vec![WeekDay::Tuesday, WeekDay::Friday];
        t.max_occurrences = Some(20);
        let limits = ExpansionLimits::default();
        assert_eq!(generate_occurrences(&t, &limits), generate_occurrences(&t, &limits));
    }

    #[test]
    fn test_biweekly_skips_odd_weeks() {
        let mut t = template(RecurrencePattern::Biweekly);
        t.week_days = vec![WeekDay::Monday];
        let occ = dates(&generate_occurrences(&t, &ExpansionLimits::default()));
        // start Sunday 2025-06-01: week 0 holds 06-02, week 1 (06-09) is skipped
        assert_eq!(
            occ,
            vec![
                ymd(2025, 6, 2),
                ymd(2025, 6, 16),
                ymd(2025, 6, 30),
                ymd(2025, 7, 14)
            ]
        );
    }

    #[test]
    fn test_monthly_skips_short_months() {
        let mut t = template(RecurrencePattern::Monthly);
        t.month_day = Some(31);
        t.start_date = ymd(2025, 1, 1);
        t.max_occurrences = Some(3);
        let occ = dates(&generate_occurrences(&t, &ExpansionLimits::default()));
        assert_eq!(occ, vec![ymd(2025, 1, 31), ymd(2025, 3, 31), ymd(2025, 5, 31)]);
    }

    #[test]
    fn test_end_date_is_exclusive() {
        let mut t = template(RecurrencePattern::Daily);
        t.max_occurrences = None;
        t.end_date = Some(ymd(2025, 6, 3));
        let occ = dates(&generate_occurrences(&t, &ExpansionLimits::default()));
        assert_eq!(occ, vec![ymd(2025, 6, 1), ymd(2025, 6, 2)]);
    }

    #[test]
    fn test_default_cap_and_horizon() {
        let mut t = template(RecurrencePattern::Daily);
        t.max_occurrences = None;
        let occ = generate_occurrences(&t, &ExpansionLimits::default());
        assert_eq!(occ.len(), 1000);

        let limits = ExpansionLimits {
            max_occurrences: 100_000,
            horizon_years: 1,
        };
        let occ = generate_occurrences(&t, &limits);
        // 2025-06-01 .. 2026-06-01
        assert_eq!(occ.len(), 365);
    }

    #[test]
    fn test_generate_appointments() {
        let mut t = template(RecurrencePattern::Daily);
        t.max_occurrences = Some(2);
        let mut ids = 0..;
        let appts = generate_appointments(&t, &ExpansionLimits::default(), Tz::UTC, 42, || {
            ids.next().unwrap()
        });

        assert_eq!(appts.len(), 2);
        let first = &appts[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.status, AppointmentStatus::Pending);
        assert_eq!(first.recurring_template_id, Some(500));
        assert_eq!(first.duration_millis(), 3_600_000);
        assert_eq!(
            first.scheduled_start,
            chrono::DateTime::parse_from_rfc3339("2025-06-01T09:00:00Z")
                .unwrap()
                .timestamp_millis()
        );
        assert_eq!(appts[1].scheduled_start - first.scheduled_start, 86_400_000);
    }

    #[test]
    fn test_validate_template() {
        let mut t = template(RecurrencePattern::Weekly);
        assert!(matches!(
            validate_template(&t),
            Err(SchedulingError::InvalidRecurrence(_))
        ));
        t.week_days = vec![WeekDay::Friday];
        assert!(validate_template(&t).is_ok());

        let mut both = t.clone();
        both.end_date = Some(ymd(2025, 7, 1));
        assert!(validate_template(&both).is_err());

        let mut neither = t.clone();
        neither.max_occurrences = None;
        assert!(validate_template(&neither).is_err());

        let mut zero = t.clone();
        zero.max_occurrences = Some(0);
        assert!(validate_template(&zero).is_err());

        let mut backwards = t.clone();
        backwards.max_occurrences = None;
        backwards.end_date = Some(ymd(2025, 5, 1));
        assert!(validate_template(&backwards).is_err());

        let mut same_day = t.clone();
        same_day.max_occurrences = None;
        same_day.end_date = Some(t.start_date);
        assert!(validate_template(&same_day).is_err());

        let mut short = t.clone();
        short.duration_minutes = 29;
        assert!(validate_template(&short).is_err());

        let mut late = t.clone();
        late.start_time_minutes = 1440;
        assert!(validate_template(&late).is_err());

        let mut monthly = template(RecurrencePattern::Monthly);
        monthly.month_day = Some(32);
        assert!(validate_template(&monthly).is_err());
        monthly.month_day = Some(15);
        assert!(validate_template(&monthly).is_ok());

        let mut qty = t.clone();
        qty.quantity_to_deliver = 0;
        assert!(matches!(
            validate_template(&qty),
            Err(SchedulingError::InvalidQuantity(0))
        ));
    }
}
