//! Repository Module
//!
//! SQLite CRUD as free functions over `&SqlitePool`, plus the storage traits
//! the scheduling services are written against. [`SqliteStore`] implements
//! every trait by delegating to the free functions.

pub mod appointment;
pub mod availability;
pub mod directory;
pub mod recurring;

use async_trait::async_trait;
use shared::models::{
    Appointment, AppointmentFilter, AppointmentStatus, AvailabilitySlot, BookingScope, Employee,
    Operation, Product, RecurringTemplate, Supplier,
};
use sqlx::SqlitePool;
use thiserror::Error;

/// Message raised by the overlap triggers in the initial migration
pub const OVERLAP_ABORT: &str = "appointment_overlap";

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The storage-level overlap guard rejected the write
    #[error("Overlapping appointment rejected by storage")]
    Overlap,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.message().contains(OVERLAP_ABORT) {
                return RepoError::Overlap;
            }
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Lookup-by-id for entities the scheduler references but does not own.
/// `Ok(None)` means the entity does not exist (or is inactive).
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn supplier(&self, id: i64) -> RepoResult<Option<Supplier>>;
    async fn employee(&self, id: i64) -> RepoResult<Option<Employee>>;
    async fn operation(&self, id: i64) -> RepoResult<Option<Operation>>;
    async fn product(&self, id: i64) -> RepoResult<Option<Product>>;
}

/// Appointment persistence
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find(&self, id: i64) -> RepoResult<Option<Appointment>>;

    /// Active (non-cancelled, non-deleted) appointments of one resource whose
    /// interval overlaps `[start, end)`, skipping `exclude_id`
    async fn find_overlapping(
        &self,
        scope: BookingScope,
        start: i64,
        end: i64,
        exclude_id: Option<i64>,
    ) -> RepoResult<Vec<Appointment>>;

    async fn insert(&self, appointment: &Appointment) -> RepoResult<()>;

    async fn update(&self, appointment: &Appointment) -> RepoResult<()>;

    async fn soft_delete(&self, id: i64, now: i64) -> RepoResult<()>;

    /// Page of appointments plus the total match count
    async fn list(&self, filter: &AppointmentFilter) -> RepoResult<(Vec<Appointment>, u64)>;

    async fn upcoming(&self, now: i64, limit: u32) -> RepoResult<Vec<Appointment>>;

    /// `(status, scheduled_start)` of every live appointment
    async fn schedule_points(&self) -> RepoResult<Vec<(AppointmentStatus, i64)>>;
}

/// Recurring template persistence
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn find_template(&self, id: i64) -> RepoResult<Option<RecurringTemplate>>;

    async fn insert_template(&self, template: &RecurringTemplate) -> RepoResult<()>;

    /// Insert every occurrence and freeze the template in one transaction
    async fn insert_occurrences(
        &self,
        template_id: i64,
        occurrences: &[Appointment],
        now: i64,
    ) -> RepoResult<()>;

    async fn occurrences(&self, template_id: i64) -> RepoResult<Vec<Appointment>>;
}

/// Availability slot persistence
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn find_slot(&self, id: i64) -> RepoResult<Option<AvailabilitySlot>>;

    /// Active slots of an employee at an operation
    async fn slots_for(&self, employee_id: i64, operation_id: i64)
    -> RepoResult<Vec<AvailabilitySlot>>;

    async fn insert_slot(&self, slot: &AvailabilitySlot) -> RepoResult<()>;

    async fn deactivate_slot(&self, id: i64, now: i64) -> RepoResult<()>;
}

/// SQLite-backed implementation of every storage trait
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DirectoryLookup for SqliteStore {
    async fn supplier(&self, id: i64) -> RepoResult<Option<Supplier>> {
        directory::find_supplier(&self.pool, id).await
    }

    async fn employee(&self, id: i64) -> RepoResult<Option<Employee>> {
        directory::find_employee(&self.pool, id).await
    }

    async fn operation(&self, id: i64) -> RepoResult<Option<Operation>> {
        directory::find_operation(&self.pool, id).await
    }

    async fn product(&self, id: i64) -> RepoResult<Option<Product>> {
        directory::find_product(&self.pool, id).await
    }
}

#[async_trait]
impl AppointmentStore for SqliteStore {
    async fn find(&self, id: i64) -> RepoResult<Option<Appointment>> {
        appointment::find_by_id(&self.pool, id).await
    }

    async fn find_overlapping(
        &self,
        scope: BookingScope,
        start: i64,
        end: i64,
        exclude_id: Option<i64>,
    ) -> RepoResult<Vec<Appointment>> {
        appointment::find_overlapping(&self.pool, scope, start, end, exclude_id).await
    }

    async fn insert(&self, appointment: &Appointment) -> RepoResult<()> {
        appointment::insert(&self.pool, appointment).await
    }

    async fn update(&self, appointment: &Appointment) -> RepoResult<()> {
        appointment::update(&self.pool, appointment).await
    }

    async fn soft_delete(&self, id: i64, now: i64) -> RepoResult<()> {
        appointment::soft_delete(&self.pool, id, now).await
    }

    async fn list(&self, filter: &AppointmentFilter) -> RepoResult<(Vec<Appointment>, u64)> {
        appointment::list(&self.pool, filter).await
    }

    async fn upcoming(&self, now: i64, limit: u32) -> RepoResult<Vec<Appointment>> {
        appointment::find_upcoming(&self.pool, now, limit).await
    }

    async fn schedule_points(&self) -> RepoResult<Vec<(AppointmentStatus, i64)>> {
        appointment::schedule_points(&self.pool).await
    }
}

#[async_trait]
impl TemplateStore for SqliteStore {
    async fn find_template(&self, id: i64) -> RepoResult<Option<RecurringTemplate>> {
        recurring::find_by_id(&self.pool, id).await
    }

    async fn insert_template(&self, template: &RecurringTemplate) -> RepoResult<()> {
        recurring::insert(&self.pool, template).await
    }

    async fn insert_occurrences(
        &self,
        template_id: i64,
        occurrences: &[Appointment],
        now: i64,
    ) -> RepoResult<()> {
        recurring::insert_occurrences(&self.pool, template_id, occurrences, now).await
    }

    async fn occurrences(&self, template_id: i64) -> RepoResult<Vec<Appointment>> {
        appointment::find_by_template(&self.pool, template_id).await
    }
}

#[async_trait]
impl SlotStore for SqliteStore {
    async fn find_slot(&self, id: i64) -> RepoResult<Option<AvailabilitySlot>> {
        availability::find_by_id(&self.pool, id).await
    }

    async fn slots_for(
        &self,
        employee_id: i64,
        operation_id: i64,
    ) -> RepoResult<Vec<AvailabilitySlot>> {
        availability::find_active_for(&self.pool, employee_id, operation_id).await
    }

    async fn insert_slot(&self, slot: &AvailabilitySlot) -> RepoResult<()> {
        availability::insert(&self.pool, slot).await
    }

    async fn deactivate_slot(&self, id: i64, now: i64) -> RepoResult<()> {
        availability::deactivate(&self.pool, id, now).await
    }
}
