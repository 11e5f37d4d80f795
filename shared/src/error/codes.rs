//! Unified error codes for the scheduling portal
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 4xxx: Appointment errors
//! - 5xxx: Recurrence errors
//! - 6xxx: Directory (referenced entity) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Status transition not allowed for this actor
    TransitionForbidden = 2002,

    // ==================== 4xxx: Appointment ====================
    /// Appointment not found
    AppointmentNotFound = 4001,
    /// Appointment overlaps an existing booking
    AppointmentConflict = 4002,
    /// Start is not before end
    InvalidTimeRange = 4003,
    /// Appointment shorter than the minimum duration
    InvalidDuration = 4004,
    /// Appointment falls outside operation hours
    OutsideBusinessHours = 4005,
    /// Appointment is cancelled or completed
    AppointmentImmutable = 4006,
    /// Cancellation needs a reason
    CancellationReasonRequired = 4007,
    /// Quantity must be positive
    InvalidQuantity = 4008,
    /// Date range query too wide
    DateRangeTooWide = 4009,

    // ==================== 5xxx: Recurrence ====================
    /// Recurring template not found
    TemplateNotFound = 5001,
    /// Recurring template is invalid
    InvalidRecurrence = 5002,
    /// Template already generated occurrences
    TemplateImmutable = 5003,
    /// Availability slot not found
    SlotNotFound = 5101,
    /// Availability slot overlaps another slot
    SlotConflict = 5102,

    // ==================== 6xxx: Directory ====================
    /// Supplier not found
    SupplierNotFound = 6001,
    /// Employee not found
    EmployeeNotFound = 6002,
    /// Operation not found
    OperationNotFound = 6003,
    /// Product not found
    ProductNotFound = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Timeout error
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::TransitionForbidden => "Status transition not allowed",

            // Appointment
            ErrorCode::AppointmentNotFound => "Appointment not found",
            ErrorCode::AppointmentConflict => "Appointment overlaps an existing booking",
            ErrorCode::InvalidTimeRange => "Start time must be before end time",
            ErrorCode::InvalidDuration => "Appointment must last at least one hour",
            ErrorCode::OutsideBusinessHours => "Appointment is outside operation hours",
            ErrorCode::AppointmentImmutable => "Appointment can no longer be modified",
            ErrorCode::CancellationReasonRequired => "Cancellation reason is required",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",
            ErrorCode::DateRangeTooWide => "Date range is too wide",

            // Recurrence
            ErrorCode::TemplateNotFound => "Recurring template not found",
            ErrorCode::InvalidRecurrence => "Recurring template is invalid",
            ErrorCode::TemplateImmutable => "Recurring template already has occurrences",
            ErrorCode::SlotNotFound => "Availability slot not found",
            ErrorCode::SlotConflict => "Availability slot overlaps an existing slot",

            // Directory
            ErrorCode::SupplierNotFound => "Supplier not found",
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::OperationNotFound => "Operation not found",
            ErrorCode::ProductNotFound => "Product not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::TransitionForbidden),

            // Appointment
            4001 => Ok(ErrorCode::AppointmentNotFound),
            4002 => Ok(ErrorCode::AppointmentConflict),
            4003 => Ok(ErrorCode::InvalidTimeRange),
            4004 => Ok(ErrorCode::InvalidDuration),
            4005 => Ok(ErrorCode::OutsideBusinessHours),
            4006 => Ok(ErrorCode::AppointmentImmutable),
            4007 => Ok(ErrorCode::CancellationReasonRequired),
            4008 => Ok(ErrorCode::InvalidQuantity),
            4009 => Ok(ErrorCode::DateRangeTooWide),

            // Recurrence
            5001 => Ok(ErrorCode::TemplateNotFound),
            5002 => Ok(ErrorCode::InvalidRecurrence),
            5003 => Ok(ErrorCode::TemplateImmutable),
            5101 => Ok(ErrorCode::SlotNotFound),
            5102 => Ok(ErrorCode::SlotConflict),

            // Directory
            6001 => Ok(ErrorCode::SupplierNotFound),
            6002 => Ok(ErrorCode::EmployeeNotFound),
            6003 => Ok(ErrorCode::OperationNotFound),
            6004 => Ok(ErrorCode::ProductNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::TransitionForbidden.code(), 2002);
        assert_eq!(ErrorCode::AppointmentConflict.code(), 4002);
        assert_eq!(ErrorCode::InvalidRecurrence.code(), 5002);
        assert_eq!(ErrorCode::ProductNotFound.code(), 6004);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::PermissionDenied,
            ErrorCode::TransitionForbidden,
            ErrorCode::AppointmentNotFound,
            ErrorCode::AppointmentConflict,
            ErrorCode::InvalidTimeRange,
            ErrorCode::InvalidDuration,
            ErrorCode::OutsideBusinessHours,
            ErrorCode::AppointmentImmutable,
            ErrorCode::CancellationReasonRequired,
            ErrorCode::InvalidQuantity,
            ErrorCode::DateRangeTooWide,
            ErrorCode::TemplateNotFound,
            ErrorCode::InvalidRecurrence,
            ErrorCode::TemplateImmutable,
            ErrorCode::SlotNotFound,
            ErrorCode::SlotConflict,
            ErrorCode::SupplierNotFound,
            ErrorCode::EmployeeNotFound,
            ErrorCode::OperationNotFound,
            ErrorCode::ProductNotFound,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::TimeoutError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::AppointmentConflict).unwrap();
        assert_eq!(json, "4002");

        let code: ErrorCode = serde_json::from_str("4005").unwrap();
        assert_eq!(code, ErrorCode::OutsideBusinessHours);

        assert!(serde_json::from_str::<ErrorCode>("4242").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::AppointmentConflict.to_string(), "E4002");
        assert_eq!(InvalidErrorCode(77).to_string(), "invalid error code: 77");
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::AppointmentNotFound.is_success());
    }
}
