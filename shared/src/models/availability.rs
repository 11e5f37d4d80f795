//! Availability Slot Model (employee working window at an operation)

use super::recurring::WeekDay;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Availability slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AvailabilitySlot {
    pub id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub day_of_week: WeekDay,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub is_recurring: bool,
    /// Required when not recurring
    pub specific_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create availability slot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlotCreate {
    pub employee_id: i64,
    pub operation_id: i64,
    pub day_of_week: WeekDay,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_recurring: bool,
    pub specific_date: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}
