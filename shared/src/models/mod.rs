//! Data models
//!
//! Shared between portal-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are UTC millis.

pub mod actor;
pub mod appointment;
pub mod availability;
pub mod directory;
pub mod recurring;

// Re-exports
pub use actor::*;
pub use appointment::*;
pub use availability::*;
pub use directory::*;
pub use recurring::*;
