//! Scheduling engine
//!
//! Pure rules the services compose:
//! - [`window`]: time range, duration and business hours
//! - [`conflict`]: overlap detection per employee and supplier
//! - [`status`]: status graph and role matrix
//! - [`recurrence`]: template expansion
//! - [`availability`]: employee working slots

pub mod availability;
pub mod conflict;
pub mod error;
pub mod recurrence;
pub mod status;
pub mod window;

pub use error::{EntityKind, SchedulingError, SchedulingResult};
pub use recurrence::ExpansionLimits;
pub use window::BusinessHours;
