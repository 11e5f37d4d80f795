//! 预约门户端到端测试
//!
//! 使用 ServerState::with_db 完整装配服务，覆盖：
//! - 创建 → 冲突示例
//! - 随机重叠区间属性测试
//! - 文件数据库上的并发创建竞争（存储层触发器兜底）
//! - 周期模板展开

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use portal_server::db::DbService;
use portal_server::db::repository::{AppointmentStore, RepoError, directory};
use portal_server::{Config, SchedulingError, ServerState};
use rand::Rng;
use shared::models::{
    Actor, Appointment, AppointmentCreate, AppointmentStatus, BookingScope, Employee, Operation,
    Product, RecurrencePattern, RecurringTemplateCreate, Supplier, WeekDay,
};

const SUPPLIER: i64 = 1;
const EMPLOYEE: i64 = 2;
const OPERATION: i64 = 3;
const PRODUCT: i64 = 4;
const HOUR: i64 = 3_600_000;

fn at(rfc3339: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .timestamp_millis()
}

async fn seed(db: &DbService) {
    let pool = &db.pool;
    directory::insert_supplier(
        pool,
        &Supplier {
            id: SUPPLIER,
            company_name: "Acme Foods".into(),
            contact_email: None,
            is_active: true,
        },
    )
    .await
    .unwrap();
    directory::insert_operation(
        pool,
        &Operation {
            id: OPERATION,
            name: "Central Warehouse".into(),
            code: "CW".into(),
            opening_time: "08:00".into(),
            closing_time: "18:00".into(),
            is_active: true,
        },
    )
    .await
    .unwrap();
    directory::insert_employee(
        pool,
        &Employee {
            id: EMPLOYEE,
            name: "Marta".into(),
            operation_id: Some(OPERATION),
            is_active: true,
        },
    )
    .await
    .unwrap();
    directory::insert_product(
        pool,
        &Product {
            id: PRODUCT,
            name: "Olive oil".into(),
            sku: None,
            supplier_id: Some(SUPPLIER),
            is_active: true,
        },
    )
    .await
    .unwrap();
}

fn config() -> Config {
    let mut config = Config::with_overrides(":memory:", Tz::UTC);
    config.notify_buffer = 4096;
    config
}

async fn memory_state() -> ServerState {
    let db = DbService::open_in_memory().await.unwrap();
    seed(&db).await;
    let (state, _events) = ServerState::with_db(&config(), db);
    state
}

fn booking(start: i64, end: i64) -> AppointmentCreate {
    AppointmentCreate {
        supplier_id: SUPPLIER,
        employee_id: EMPLOYEE,
        operation_id: OPERATION,
        product_id: PRODUCT,
        scheduled_start: start,
        scheduled_end: end,
        quantity_to_deliver: 12,
        notes: Some("two pallets".into()),
        status: None,
    }
}

#[tokio::test]
async fn test_create_then_conflict() {
    let state = memory_state().await;

    let first = state
        .appointments
        .create(booking(
            at("2025-06-01T10:00:00Z"),
            at("2025-06-01T11:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status, AppointmentStatus::Pending);

    let err = state
        .appointments
        .create(booking(
            at("2025-06-01T10:30:00Z"),
            at("2025-06-01T11:30:00Z"),
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::Conflict {
            scope: BookingScope::Employee(EMPLOYEE),
            appointment_id,
        } if appointment_id == first.id
    ));

    // back-to-back is fine
    state
        .appointments
        .create(booking(
            at("2025-06-01T11:00:00Z"),
            at("2025-06-01T12:00:00Z"),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_random_overlapping_pairs_are_rejected() {
    let state = memory_state().await;
    let mut rng = rand::thread_rng();
    let base = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();

    for day in 0..25u64 {
        let date = base + Days::new(day);
        let midnight = date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis();

        // first booking: 1-3 hours inside 08:00-18:00, on a 15 minute grid
        let quarter = HOUR / 4;
        let len1 = rng.gen_range(4..=12) * quarter;
        let start1 = midnight + 8 * HOUR + rng.gen_range(0..=(10 * HOUR - len1) / quarter) * quarter;
        let end1 = start1 + len1;

        // second booking starts strictly inside the first one
        let start2 = start1 + rng.gen_range(0..len1 / quarter) * quarter;
        let len2 = HOUR.max(rng.gen_range(4..=8) * quarter);
        let end2 = (start2 + len2).min(midnight + 18 * HOUR);
        let start2 = start2.min(end2 - HOUR);

        state
            .appointments
            .create(booking(start1, end1))
            .await
            .unwrap();
        let second = state.appointments.create(booking(start2, end2)).await;
        assert!(
            matches!(second, Err(SchedulingError::Conflict { .. })),
            "[{start1},{end1}) vs [{start2},{end2}) on {date}: {second:?}"
        );
    }
}

#[tokio::test]
async fn test_storage_rejects_overlap_without_service_check() {
    let state = memory_state().await;
    let start = at("2025-06-03T09:00:00Z");

    let row = |id: i64, start: i64| Appointment {
        id,
        supplier_id: SUPPLIER,
        employee_id: EMPLOYEE,
        operation_id: OPERATION,
        product_id: PRODUCT,
        scheduled_start: start,
        scheduled_end: start + HOUR,
        status: AppointmentStatus::Pending,
        quantity_to_deliver: 1,
        notes: None,
        cancellation_reason: None,
        confirmed_at: None,
        cancelled_at: None,
        completed_at: None,
        recurring_template_id: None,
        created_at: 0,
        updated_at: 0,
    };

    state.store.insert(&row(1, start)).await.unwrap();
    assert!(matches!(
        state.store.insert(&row(2, start + HOUR / 2)).await,
        Err(RepoError::Overlap)
    ));

    // moving a non-overlapping row onto the first one is rejected too
    state.store.insert(&row(3, start + 2 * HOUR)).await.unwrap();
    assert!(matches!(
        state.store.update(&row(3, start + HOUR / 2)).await,
        Err(RepoError::Overlap)
    ));
}

#[tokio::test]
async fn test_concurrent_creates_book_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.db");
    let db = DbService::new(&path.to_string_lossy()).await.unwrap();
    seed(&db).await;
    let (state, _events) = ServerState::with_db(&config(), db);
    let service = Arc::clone(&state.appointments);

    let start = at("2025-06-04T10:00:00Z");
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            let offset = (i % 4) * HOUR / 4;
            tokio::spawn(async move {
                service
                    .create(booking(start + offset, start + offset + HOUR))
                    .await
            })
        })
        .collect();

    let mut booked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(SchedulingError::Conflict { .. }) | Err(SchedulingError::Storage(RepoError::Overlap)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(booked, 1);

    let live = state
        .store
        .find_overlapping(BookingScope::Employee(EMPLOYEE), start - HOUR, start + 3 * HOUR, None)
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
}

#[tokio::test]
async fn test_template_materialization_and_lifecycle() {
    let state = memory_state().await;
    let start_date = portal_server::utils::time::today(Tz::UTC) + Days::new(1);

    let template = state
        .recurring
        .create_template(RecurringTemplateCreate {
            supplier_id: SUPPLIER,
            employee_id: EMPLOYEE,
            operation_id: OPERATION,
            product_id: PRODUCT,
            quantity_to_deliver: 3,
            notes: None,
            pattern: RecurrencePattern::Daily,
            start_date,
            end_date: Some(start_date + Days::new(5)),
            max_occurrences: None,
            start_time_minutes: 9 * 60,
            duration_minutes: 90,
            week_days: vec![],
            month_day: None,
            exclusion_dates: vec![start_date + Days::new(2)],
        })
        .await
        .unwrap();

    let created = state.recurring.materialize(template.id).await.unwrap();
    // days 0..5, minus the excluded day; the end date itself is not booked
    assert_eq!(created.len(), 4);
    let end_millis = portal_server::utils::time::date_minutes_to_millis(
        start_date + Days::new(5),
        0,
        Tz::UTC,
    );
    assert!(created.iter().all(|a| a.scheduled_start < end_millis));
    assert!(
        created
            .iter()
            .all(|a| a.recurring_template_id == Some(template.id))
    );

    // occurrences follow the normal status graph
    let first = &created[0];
    let confirmed = state
        .appointments
        .update_status(&Actor::Employee(EMPLOYEE), first.id, AppointmentStatus::Confirmed, None)
        .await
        .unwrap();
    assert!(confirmed.confirmed_at.is_some());

    let rescheduled = state
        .appointments
        .update_status(&Actor::Supplier(SUPPLIER), first.id, AppointmentStatus::Rescheduled, None)
        .await
        .unwrap();
    assert_eq!(rescheduled.status, AppointmentStatus::Rescheduled);

    assert!(matches!(
        state.recurring.materialize(template.id).await,
        Err(SchedulingError::TemplateImmutable(_))
    ));

    let upcoming = state.appointments.upcoming(10).await.unwrap();
    assert_eq!(upcoming.len(), 4);
    assert!(upcoming.windows(2).all(|w| w[0].scheduled_start <= w[1].scheduled_start));
}
