//! Appointment Repository

use super::{RepoError, RepoResult};
use shared::models::{Appointment, AppointmentFilter, AppointmentStatus, BookingScope};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT: &str = "SELECT id, supplier_id, employee_id, operation_id, product_id, scheduled_start, scheduled_end, status, quantity_to_deliver, notes, cancellation_reason, confirmed_at, cancelled_at, completed_at, recurring_template_id, created_at, updated_at FROM appointment";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Appointment>> {
    let sql = format!("{SELECT} WHERE id = ? AND deleted_at IS NULL");
    let appointment = sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(appointment)
}

pub async fn find_overlapping(
    pool: &SqlitePool,
    scope: BookingScope,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<Vec<Appointment>> {
    let column = match scope {
        BookingScope::Employee(_) => "employee_id",
        BookingScope::Supplier(_) => "supplier_id",
    };
    let sql = format!(
        "{SELECT} WHERE deleted_at IS NULL AND status <> 'cancelled' AND {column} = ? AND scheduled_start < ? AND ? < scheduled_end AND (? IS NULL OR id <> ?) ORDER BY scheduled_start"
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(scope.id())
        .bind(end)
        .bind(start)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_template(pool: &SqlitePool, template_id: i64) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{SELECT} WHERE recurring_template_id = ? AND deleted_at IS NULL ORDER BY scheduled_start"
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(template_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_upcoming(pool: &SqlitePool, now: i64, limit: u32) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{SELECT} WHERE deleted_at IS NULL AND status <> 'cancelled' AND scheduled_start > ? ORDER BY scheduled_start ASC, id ASC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(now)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert through any executor (pool or open transaction)
pub(super) async fn insert_with<'e, E>(executor: E, a: &Appointment) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO appointment (id, supplier_id, employee_id, operation_id, product_id, scheduled_start, scheduled_end, status, quantity_to_deliver, notes, cancellation_reason, confirmed_at, cancelled_at, completed_at, recurring_template_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )
    .bind(a.id)
    .bind(a.supplier_id)
    .bind(a.employee_id)
    .bind(a.operation_id)
    .bind(a.product_id)
    .bind(a.scheduled_start)
    .bind(a.scheduled_end)
    .bind(a.status)
    .bind(a.quantity_to_deliver)
    .bind(&a.notes)
    .bind(&a.cancellation_reason)
    .bind(a.confirmed_at)
    .bind(a.cancelled_at)
    .bind(a.completed_at)
    .bind(a.recurring_template_id)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert(pool: &SqlitePool, appointment: &Appointment) -> RepoResult<()> {
    insert_with(pool, appointment).await
}

pub async fn update(pool: &SqlitePool, a: &Appointment) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE appointment SET supplier_id = ?1, employee_id = ?2, operation_id = ?3, product_id = ?4, scheduled_start = ?5, scheduled_end = ?6, status = ?7, quantity_to_deliver = ?8, notes = ?9, cancellation_reason = ?10, confirmed_at = ?11, cancelled_at = ?12, completed_at = ?13, updated_at = ?14 WHERE id = ?15 AND deleted_at IS NULL",
    )
    .bind(a.supplier_id)
    .bind(a.employee_id)
    .bind(a.operation_id)
    .bind(a.product_id)
    .bind(a.scheduled_start)
    .bind(a.scheduled_end)
    .bind(a.status)
    .bind(a.quantity_to_deliver)
    .bind(&a.notes)
    .bind(&a.cancellation_reason)
    .bind(a.confirmed_at)
    .bind(a.cancelled_at)
    .bind(a.completed_at)
    .bind(a.updated_at)
    .bind(a.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {} not found", a.id)));
    }
    Ok(())
}

pub async fn soft_delete(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE appointment SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &AppointmentFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(start) = filter.start {
        qb.push(" AND scheduled_start >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        qb.push(" AND scheduled_end <= ").push_bind(end);
    }
    if let Some(supplier_id) = filter.supplier_id {
        qb.push(" AND supplier_id = ").push_bind(supplier_id);
    }
    if let Some(employee_id) = filter.employee_id {
        qb.push(" AND employee_id = ").push_bind(employee_id);
    }
    if let Some(operation_id) = filter.operation_id {
        qb.push(" AND operation_id = ").push_bind(operation_id);
    }
}

pub async fn list(
    pool: &SqlitePool,
    filter: &AppointmentFilter,
) -> RepoResult<(Vec<Appointment>, u64)> {
    let mut count = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM appointment WHERE deleted_at IS NULL",
    );
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new(format!("{SELECT} WHERE deleted_at IS NULL"));
    push_filters(&mut query, filter);
    // sort column comes from a closed enum, never from user text
    query.push(format!(
        " ORDER BY {} {}, id ASC LIMIT ",
        filter.sort_by.column(),
        filter.sort_direction.keyword()
    ));
    query.push_bind(filter.limit() as i64);
    query.push(" OFFSET ");
    query.push_bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX));

    let rows = query
        .build_query_as::<Appointment>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total.max(0) as u64))
}

pub async fn schedule_points(pool: &SqlitePool) -> RepoResult<Vec<(AppointmentStatus, i64)>> {
    let rows = sqlx::query_as::<_, (AppointmentStatus, i64)>(
        "SELECT status, scheduled_start FROM appointment WHERE deleted_at IS NULL",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
