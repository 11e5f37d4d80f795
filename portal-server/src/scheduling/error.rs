use std::fmt;

use chrono::NaiveTime;
use shared::error::{AppError, ErrorCode};
use shared::models::{AppointmentStatus, BookingScope, Role};
use thiserror::Error;

use crate::db::repository::RepoError;

/// Directory entities an appointment references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Supplier,
    Employee,
    Operation,
    Product,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Supplier => "supplier",
            Self::Employee => "employee",
            Self::Operation => "operation",
            Self::Product => "product",
        })
    }
}

/// Scheduling errors
///
/// Every variant except `Storage` is a business failure scoped to one request.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    #[error("Start time must be before end time")]
    InvalidRange { start: i64, end: i64 },

    #[error("Appointment lasts {minutes} minutes, minimum is {min_minutes}")]
    InvalidDuration { minutes: i64, min_minutes: i64 },

    #[error("Appointment must fall within operation hours {opening}-{closing}")]
    OutOfHours {
        opening: NaiveTime,
        closing: NaiveTime,
    },

    #[error("Referenced {entity} {id} does not exist")]
    InvalidReference { entity: EntityKind, id: i64 },

    #[error("Overlaps appointment {appointment_id} of the same {}", scope.kind())]
    Conflict {
        scope: BookingScope,
        appointment_id: i64,
    },

    #[error("Transition {from} -> {to} is not allowed for {role:?}")]
    ForbiddenTransition {
        role: Role,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment is {status} and can no longer be modified")]
    ImmutableState { status: AppointmentStatus },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Cancellation reason is required")]
    ReasonRequired,

    #[error("Quantity must be greater than zero (got {0})")]
    InvalidQuantity(i64),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Template {0} already has occurrences")]
    TemplateImmutable(i64),

    #[error("Overlaps availability slot {0}")]
    SlotConflict(i64),

    #[error("Date range of {days} days exceeds the {limit}-day limit")]
    DateRangeTooWide { days: i64, limit: i64 },

    #[error("{0}")]
    Validation(String),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

impl SchedulingError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

fn reference_code(entity: EntityKind) -> ErrorCode {
    match entity {
        EntityKind::Supplier => ErrorCode::SupplierNotFound,
        EntityKind::Employee => ErrorCode::EmployeeNotFound,
        EntityKind::Operation => ErrorCode::OperationNotFound,
        EntityKind::Product => ErrorCode::ProductNotFound,
    }
}

fn not_found_code(entity: &str) -> ErrorCode {
    match entity {
        "appointment" => ErrorCode::AppointmentNotFound,
        "template" => ErrorCode::TemplateNotFound,
        "slot" => ErrorCode::SlotNotFound,
        _ => ErrorCode::NotFound,
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        let message = err.to_string();
        match err {
            SchedulingError::Storage(RepoError::Overlap) => {
                AppError::with_message(ErrorCode::AppointmentConflict, message)
            }
            SchedulingError::Storage(RepoError::NotFound(_)) => {
                AppError::with_message(ErrorCode::NotFound, message)
            }
            SchedulingError::Storage(RepoError::Duplicate(_)) => {
                AppError::with_message(ErrorCode::AlreadyExists, message)
            }
            SchedulingError::Storage(RepoError::Validation(_)) => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
            }
            SchedulingError::Storage(RepoError::Database(_)) => {
                tracing::error!(error = %message, "Storage failure");
                AppError::database(message)
            }
            SchedulingError::InvalidRange { start, end } => {
                AppError::with_message(ErrorCode::InvalidTimeRange, message)
                    .with_detail("start", start)
                    .with_detail("end", end)
            }
            SchedulingError::InvalidDuration { minutes, .. } => {
                AppError::with_message(ErrorCode::InvalidDuration, message)
                    .with_detail("minutes", minutes)
            }
            SchedulingError::OutOfHours { opening, closing } => {
                AppError::with_message(ErrorCode::OutsideBusinessHours, message)
                    .with_detail("opening", opening.format("%H:%M").to_string())
                    .with_detail("closing", closing.format("%H:%M").to_string())
            }
            SchedulingError::InvalidReference { entity, id } => {
                AppError::with_message(reference_code(entity), message)
                    .with_detail("entity", entity.to_string())
                    .with_detail("id", id)
            }
            SchedulingError::Conflict {
                scope,
                appointment_id,
            } => AppError::with_message(ErrorCode::AppointmentConflict, message)
                .with_detail("scope", scope.kind())
                .with_detail("appointment_id", appointment_id),
            SchedulingError::ForbiddenTransition { from, to, .. } => {
                AppError::with_message(ErrorCode::TransitionForbidden, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            SchedulingError::ImmutableState { status } => {
                AppError::with_message(ErrorCode::AppointmentImmutable, message)
                    .with_detail("status", status.as_str())
            }
            SchedulingError::NotFound { entity, id } => {
                AppError::with_message(not_found_code(entity), message).with_detail("id", id)
            }
            SchedulingError::ReasonRequired => {
                AppError::with_message(ErrorCode::CancellationReasonRequired, message)
            }
            SchedulingError::InvalidQuantity(_) => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
            }
            SchedulingError::InvalidRecurrence(_) => {
                AppError::with_message(ErrorCode::InvalidRecurrence, message)
            }
            SchedulingError::TemplateImmutable(id) => {
                AppError::with_message(ErrorCode::TemplateImmutable, message)
                    .with_detail("template_id", id)
            }
            SchedulingError::SlotConflict(id) => {
                AppError::with_message(ErrorCode::SlotConflict, message).with_detail("slot_id", id)
            }
            SchedulingError::DateRangeTooWide { days, limit } => {
                AppError::with_message(ErrorCode::DateRangeTooWide, message)
                    .with_detail("days", days)
                    .with_detail("limit", limit)
            }
            SchedulingError::Validation(_) => AppError::validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_conflict_code() {
        let err: AppError = SchedulingError::Conflict {
            scope: BookingScope::Employee(2),
            appointment_id: 77,
        }
        .into();
        assert_eq!(err.code, ErrorCode::AppointmentConflict);
        assert_eq!(err.message, "Overlaps appointment 77 of the same employee");
        let details = err.details.unwrap();
        assert_eq!(details.get("scope").unwrap(), "employee");
    }

    #[test]
    fn test_storage_overlap_keeps_conflict_code() {
        let err: AppError = SchedulingError::Storage(RepoError::Overlap).into();
        assert_eq!(err.code, ErrorCode::AppointmentConflict);
    }

    #[test]
    fn test_reference_names_entity() {
        let err: AppError = SchedulingError::InvalidReference {
            entity: EntityKind::Operation,
            id: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::OperationNotFound);
        assert_eq!(err.message, "Referenced operation 5 does not exist");
    }

    #[test]
    fn test_database_error_passthrough() {
        let err: AppError =
            SchedulingError::Storage(RepoError::Database("disk I/O error".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("disk I/O error"));
    }

    #[test]
    fn test_not_found_entity_codes() {
        let err: AppError = SchedulingError::not_found("template", 3).into();
        assert_eq!(err.code, ErrorCode::TemplateNotFound);
        let err: AppError = SchedulingError::not_found("appointment", 3).into();
        assert_eq!(err.code, ErrorCode::AppointmentNotFound);
    }
}
