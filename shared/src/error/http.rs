//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::AppointmentNotFound
            | Self::TemplateNotFound
            | Self::SlotNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::AppointmentConflict
            | Self::AppointmentImmutable
            | Self::TemplateImmutable
            | Self::SlotConflict => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::PermissionDenied | Self::TransitionForbidden => StatusCode::FORBIDDEN,

            // 422 Unprocessable: request is well-formed but references missing entities
            Self::SupplierNotFound
            | Self::EmployeeNotFound
            | Self::OperationNotFound
            | Self::ProductNotFound => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
