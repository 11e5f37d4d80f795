//! Shared types for the scheduling portal
//!
//! Domain models, error codes, response envelopes and small utilities used
//! by the server and API consumers.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use pagination::PaginatedResponse;
