//! Availability Slot Repository

use super::{RepoError, RepoResult};
use shared::models::AvailabilitySlot;
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, employee_id, operation_id, day_of_week, start_time, end_time, is_recurring, specific_date, is_active, created_at, updated_at FROM availability_slot";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AvailabilitySlot>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let slot = sqlx::query_as::<_, AvailabilitySlot>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(slot)
}

pub async fn find_active_for(
    pool: &SqlitePool,
    employee_id: i64,
    operation_id: i64,
) -> RepoResult<Vec<AvailabilitySlot>> {
    let sql = format!(
        "{SELECT} WHERE employee_id = ? AND operation_id = ? AND is_active = 1 ORDER BY start_time"
    );
    let slots = sqlx::query_as::<_, AvailabilitySlot>(&sql)
        .bind(employee_id)
        .bind(operation_id)
        .fetch_all(pool)
        .await?;
    Ok(slots)
}

pub async fn insert(pool: &SqlitePool, s: &AvailabilitySlot) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO availability_slot (id, employee_id, operation_id, day_of_week, start_time, end_time, is_recurring, specific_date, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(s.id)
    .bind(s.employee_id)
    .bind(s.operation_id)
    .bind(s.day_of_week)
    .bind(&s.start_time)
    .bind(&s.end_time)
    .bind(s.is_recurring)
    .bind(s.specific_date)
    .bind(s.is_active)
    .bind(s.created_at)
    .bind(s.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn deactivate(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE availability_slot SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Availability slot {id} not found or already inactive"
        )));
    }
    Ok(())
}
