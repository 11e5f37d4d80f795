//! Conflict detection
//!
//! An appointment conflicts with another when both are active, they share
//! the employee or the supplier, and their half-open intervals intersect.
//! Employee and supplier are checked independently.

use shared::models::{Appointment, AppointmentStatus, BookingScope};

use super::error::{SchedulingError, SchedulingResult};
use crate::db::repository::AppointmentStore;

/// `[s1, e1)` and `[s2, e2)` intersect
#[inline]
pub fn overlaps(s1: i64, e1: i64, s2: i64, e2: i64) -> bool {
    s1 < e2 && s2 < e1
}

/// Scopes a candidate books, employee first
pub fn scopes_of(candidate: &Appointment) -> [BookingScope; 2] {
    [
        BookingScope::Employee(candidate.employee_id),
        BookingScope::Supplier(candidate.supplier_id),
    ]
}

fn in_scope(scope: BookingScope, other: &Appointment) -> bool {
    match scope {
        BookingScope::Employee(id) => other.employee_id == id,
        BookingScope::Supplier(id) => other.supplier_id == id,
    }
}

/// First existing appointment that blocks `candidate` within `scope`
pub fn first_conflict<'a>(
    candidate: &Appointment,
    scope: BookingScope,
    existing: &'a [Appointment],
    exclude_id: Option<i64>,
) -> Option<&'a Appointment> {
    if candidate.status == AppointmentStatus::Cancelled {
        return None;
    }
    existing.iter().find(|other| {
        Some(other.id) != exclude_id
            && other.status != AppointmentStatus::Cancelled
            && in_scope(scope, other)
            && overlaps(
                candidate.scheduled_start,
                candidate.scheduled_end,
                other.scheduled_start,
                other.scheduled_end,
            )
    })
}

/// Query the store for each scope and return the first blocking booking
pub async fn find_conflict(
    store: &dyn AppointmentStore,
    candidate: &Appointment,
    exclude_id: Option<i64>,
) -> SchedulingResult<Option<(BookingScope, i64)>> {
    if candidate.status == AppointmentStatus::Cancelled {
        return Ok(None);
    }

    for scope in scopes_of(candidate) {
        let existing = store
            .find_overlapping(
                scope,
                candidate.scheduled_start,
                candidate.scheduled_end,
                exclude_id,
            )
            .await?;
        if let Some(hit) = first_conflict(candidate, scope, &existing, exclude_id) {
            tracing::debug!(
                scope = scope.kind(),
                resource_id = scope.id(),
                conflicting_id = hit.id,
                "Booking conflict detected"
            );
            return Ok(Some((scope, hit.id)));
        }
    }
    Ok(None)
}

pub async fn has_conflict(
    store: &dyn AppointmentStore,
    candidate: &Appointment,
    exclude_id: Option<i64>,
) -> SchedulingResult<bool> {
    Ok(find_conflict(store, candidate, exclude_id).await?.is_some())
}

/// `Err(Conflict)` when any active booking overlaps
pub async fn ensure_no_conflict(
    store: &dyn AppointmentStore,
    candidate: &Appointment,
    exclude_id: Option<i64>,
) -> SchedulingResult<()> {
    match find_conflict(store, candidate, exclude_id).await? {
        Some((scope, appointment_id)) => Err(SchedulingError::Conflict {
            scope,
            appointment_id,
        }),
        None => Ok(()),
    }
}
