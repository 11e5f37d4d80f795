//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::scheduling::SchedulingError;

// ── Text length limits ──────────────────────────────────────────────

/// Notes, cancellation reasons
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<(), SchedulingError> {
    if value.trim().is_empty() {
        return Err(SchedulingError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    if value.len() > max_len {
        return Err(SchedulingError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), SchedulingError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(SchedulingError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Quantity to deliver must be positive
pub fn validate_quantity(quantity: i64) -> Result<(), SchedulingError> {
    if quantity <= 0 {
        return Err(SchedulingError::InvalidQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("late truck", "reason", MAX_NOTE_LEN).is_ok());
        assert!(validate_required_text("   ", "reason", MAX_NOTE_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(501), "reason", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(600)), "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(SchedulingError::InvalidQuantity(0))
        ));
    }
}
