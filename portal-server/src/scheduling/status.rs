//! Appointment status state machine
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │            │
//!    │            ├──► rescheduled ──► pending
//!    ▼            ▼
//! cancelled ◄─────┘
//! ```
//!
//! Cancelled and completed are terminal. Admins may take any edge of the
//! graph; other roles only the edges in [`permits`].

use shared::models::{Actor, Appointment, AppointmentStatus};

use super::error::{SchedulingError, SchedulingResult};
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};

/// Outgoing edges of the state graph
pub fn allowed_targets(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Completed, Cancelled, Rescheduled],
        Rescheduled => &[Pending],
        Cancelled | Completed => &[],
    }
}

pub fn is_edge(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Role and ownership gate
pub fn permits(actor: &Actor, appointment: &Appointment, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    match (*actor, appointment.status, to) {
        (Actor::Admin, from, to) => is_edge(from, to),
        (Actor::Employee(_), Pending, Confirmed) => true,
        (Actor::Supplier(id), Pending, Cancelled) => id == appointment.supplier_id,
        (Actor::Employee(id), Confirmed, Completed) => id == appointment.employee_id,
        (Actor::Supplier(id), Confirmed, Cancelled | Rescheduled) => id == appointment.supplier_id,
        (Actor::Supplier(id), Rescheduled, Pending) => id == appointment.supplier_id,
        _ => false,
    }
}

pub fn authorize(
    actor: &Actor,
    appointment: &Appointment,
    to: AppointmentStatus,
) -> SchedulingResult<()> {
    if permits(actor, appointment, to) {
        Ok(())
    } else {
        Err(SchedulingError::ForbiddenTransition {
            role: actor.role(),
            from: appointment.status,
            to,
        })
    }
}

/// Authorize and apply a status change in place, stamping timestamps.
///
/// Returns the previous status.
pub fn transition(
    actor: &Actor,
    appointment: &mut Appointment,
    to: AppointmentStatus,
    reason: Option<&str>,
    now: i64,
) -> SchedulingResult<AppointmentStatus> {
    authorize(actor, appointment, to)?;

    let from = appointment.status;
    match to {
        AppointmentStatus::Confirmed => appointment.confirmed_at = Some(now),
        AppointmentStatus::Completed => appointment.completed_at = Some(now),
        AppointmentStatus::Cancelled => {
            let reason = reason
                .filter(|r| !r.trim().is_empty())
                .ok_or(SchedulingError::ReasonRequired)?;
            validate_required_text(reason, "cancellation_reason", MAX_NOTE_LEN)?;
            appointment.cancellation_reason = Some(reason.trim().to_string());
            appointment.cancelled_at = Some(now);
        }
        AppointmentStatus::Pending | AppointmentStatus::Rescheduled => {}
    }
    appointment.status = to;
    appointment.updated_at = now;
    Ok(from)
}
