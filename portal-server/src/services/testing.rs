//! Shared fixture for service tests: in-memory database with a seeded directory

use std::sync::Arc;

use chrono_tz::Tz;
use shared::models::{AppointmentCreate, Employee, Operation, Product, Supplier};
use tokio::sync::mpsc;

use super::notifier::AppointmentEvent;
use super::{AppointmentService, AvailabilityService, RecurringService};
use crate::core::{Config, ServerState};
use crate::db::DbService;
use crate::db::repository::{SqliteStore, directory};

pub(crate) struct Fixture {
    pub store: SqliteStore,
    pub appointments: Arc<AppointmentService>,
    pub recurring: Arc<RecurringService>,
    pub availability: Arc<AvailabilityService>,
    events: mpsc::Receiver<AppointmentEvent>,
}

impl Fixture {
    pub const SUPPLIER: i64 = 1;
    pub const EMPLOYEE: i64 = 2;
    pub const OPERATION: i64 = 3;
    pub const PRODUCT: i64 = 4;
    pub const OTHER_EMPLOYEE: i64 = 5;

    pub async fn new() -> Self {
        let db = DbService::open_in_memory().await.unwrap();
        seed(&db).await;

        let mut config = Config::with_overrides(":memory:", Tz::UTC);
        config.date_range_limit_days = 31;
        config.notify_buffer = 1024;
        let (state, events) = ServerState::with_db(&config, db);

        Self {
            store: state.store,
            appointments: state.appointments,
            recurring: state.recurring,
            availability: state.availability,
            events,
        }
    }

    pub fn drain_events(&mut self) -> Vec<AppointmentEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

async fn seed(db: &DbService) {
    let pool = &db.pool;
    directory::insert_supplier(
        pool,
        &Supplier {
            id: Fixture::SUPPLIER,
            company_name: "Acme Foods".into(),
            contact_email: Some("ops@acme.test".into()),
            is_active: true,
        },
    )
    .await
    .unwrap();
    directory::insert_operation(
        pool,
        &Operation {
            id: Fixture::OPERATION,
            name: "North Dock".into(),
            code: "ND".into(),
            opening_time: "08:00".into(),
            closing_time: "18:00".into(),
            is_active: true,
        },
    )
    .await
    .unwrap();
    for (id, name) in [(Fixture::EMPLOYEE, "Ana"), (Fixture::OTHER_EMPLOYEE, "Luis")] {
        directory::insert_employee(
            pool,
            &Employee {
                id,
                name: name.into(),
                operation_id: Some(Fixture::OPERATION),
                is_active: true,
            },
        )
        .await
        .unwrap();
    }
    directory::insert_product(
        pool,
        &Product {
            id: Fixture::PRODUCT,
            name: "Flour".into(),
            sku: Some("FL-25".into()),
            supplier_id: Some(Fixture::SUPPLIER),
            is_active: true,
        },
    )
    .await
    .unwrap();
}

/// RFC 3339 → Unix millis
pub(crate) fn at(rfc3339: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .timestamp_millis()
}

pub(crate) fn create_payload(start: &str, end: &str) -> AppointmentCreate {
    AppointmentCreate {
        supplier_id: Fixture::SUPPLIER,
        employee_id: Fixture::EMPLOYEE,
        operation_id: Fixture::OPERATION,
        product_id: Fixture::PRODUCT,
        scheduled_start: at(start),
        scheduled_end: at(end),
        quantity_to_deliver: 10,
        notes: None,
        status: None,
    }
}
