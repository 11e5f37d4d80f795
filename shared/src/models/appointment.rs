//! Appointment Model (delivery booking)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
        Self::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Rescheduled => "rescheduled",
        }
    }

    /// Cancelled and completed appointments accept no further changes
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment entity
///
/// Times are UTC milliseconds; the booked interval is `[scheduled_start, scheduled_end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: i64,
    pub supplier_id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub product_id: i64,
    pub scheduled_start: i64,
    pub scheduled_end: i64,
    pub status: AppointmentStatus,
    pub quantity_to_deliver: i64,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub confirmed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub completed_at: Option<i64>,
    /// Back-reference to the recurring template that generated this appointment
    pub recurring_template_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Appointment {
    /// Duration in milliseconds
    pub fn duration_millis(&self) -> i64 {
        self.scheduled_end - self.scheduled_start
    }
}

/// A bookable resource: no two active appointments of the same employee or
/// the same supplier may overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum BookingScope {
    Employee(i64),
    Supplier(i64),
}

impl BookingScope {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Employee(_) => "employee",
            Self::Supplier(_) => "supplier",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Employee(id) | Self::Supplier(id) => *id,
        }
    }
}

/// Create appointment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub supplier_id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub product_id: i64,
    pub scheduled_start: i64,
    pub scheduled_end: i64,
    pub quantity_to_deliver: i64,
    pub notes: Option<String>,
    /// Defaults to pending
    pub status: Option<AppointmentStatus>,
}

/// Update appointment payload
///
/// Status is changed through the status transition path only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    pub supplier_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub operation_id: Option<i64>,
    pub product_id: Option<i64>,
    pub scheduled_start: Option<i64>,
    pub scheduled_end: Option<i64>,
    pub quantity_to_deliver: Option<i64>,
    pub notes: Option<String>,
}

/// Sortable appointment columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    ScheduledStart,
    ScheduledEnd,
    CreatedAt,
    Status,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::ScheduledStart => "scheduled_start",
            Self::ScheduledEnd => "scheduled_end",
            Self::CreatedAt => "created_at",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Appointment list filter
///
/// `start` matches `scheduled_start >= start`, `end` matches `scheduled_end <= end`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub supplier_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub operation_id: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl AppointmentFilter {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Rows to skip; widened so any page number stays in range
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }
}

/// Aggregate appointment counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStatistics {
    pub total: u64,
    pub by_status: BTreeMap<AppointmentStatus, u64>,
    /// Local business date (`YYYY-MM-DD`) → count
    pub by_day: BTreeMap<String, u64>,
    /// Local business month (`YYYY-MM`) → count
    pub by_month: BTreeMap<String, u64>,
}
