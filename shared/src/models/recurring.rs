//! Recurring Appointment Template Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recurrence pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

/// Day of week, numbered from Sunday = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    pub fn number(&self) -> u32 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }
}

impl From<chrono::Weekday> for WeekDay {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

/// Recurring appointment template
///
/// Generates concrete appointments on demand. Once `materialized_at` is set the
/// template is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RecurringTemplate {
    pub id: i64,
    pub supplier_id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub product_id: i64,
    pub quantity_to_deliver: i64,
    pub notes: Option<String>,
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
    pub max_occurrences: Option<u32>,
    /// Minutes after local midnight (0-1439)
    pub start_time_minutes: u32,
    /// 30-480
    pub duration_minutes: u32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub week_days: Vec<WeekDay>,
    /// Required for monthly (1-31)
    pub month_day: Option<u32>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub exclusion_dates: Vec<NaiveDate>,
    pub materialized_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create recurring template payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTemplateCreate {
    pub supplier_id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub product_id: i64,
    pub quantity_to_deliver: i64,
    pub notes: Option<String>,
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub max_occurrences: Option<u32>,
    pub start_time_minutes: u32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub week_days: Vec<WeekDay>,
    pub month_day: Option<u32>,
    #[serde(default)]
    pub exclusion_dates: Vec<NaiveDate>,
}
