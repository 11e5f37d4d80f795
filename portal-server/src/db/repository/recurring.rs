//! Recurring Template Repository

use super::appointment::insert_with;
use super::{RepoError, RepoResult};
use shared::models::{Appointment, RecurringTemplate};
use sqlx::SqlitePool;
use sqlx::types::Json;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<RecurringTemplate>> {
    let template = sqlx::query_as::<_, RecurringTemplate>(
        "SELECT id, supplier_id, employee_id, operation_id, product_id, quantity_to_deliver, notes, pattern, start_date, end_date, max_occurrences, start_time_minutes, duration_minutes, week_days, month_day, exclusion_dates, materialized_at, created_at, updated_at FROM recurring_template WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(template)
}

pub async fn insert(pool: &SqlitePool, t: &RecurringTemplate) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO recurring_template (id, supplier_id, employee_id, operation_id, product_id, quantity_to_deliver, notes, pattern, start_date, end_date, max_occurrences, start_time_minutes, duration_minutes, week_days, month_day, exclusion_dates, materialized_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
    )
    .bind(t.id)
    .bind(t.supplier_id)
    .bind(t.employee_id)
    .bind(t.operation_id)
    .bind(t.product_id)
    .bind(t.quantity_to_deliver)
    .bind(&t.notes)
    .bind(t.pattern)
    .bind(t.start_date)
    .bind(t.end_date)
    .bind(t.max_occurrences)
    .bind(t.start_time_minutes)
    .bind(t.duration_minutes)
    .bind(Json(&t.week_days))
    .bind(t.month_day)
    .bind(Json(&t.exclusion_dates))
    .bind(t.materialized_at)
    .bind(t.created_at)
    .bind(t.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert generated occurrences and mark the template materialized.
///
/// All-or-nothing: an overlap on any occurrence rolls back the whole batch.
pub async fn insert_occurrences(
    pool: &SqlitePool,
    template_id: i64,
    occurrences: &[Appointment],
    now: i64,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let frozen = sqlx::query(
        "UPDATE recurring_template SET materialized_at = ?1, updated_at = ?1 WHERE id = ?2 AND materialized_at IS NULL",
    )
    .bind(now)
    .bind(template_id)
    .execute(&mut *tx)
    .await?;
    if frozen.rows_affected() == 0 {
        return Err(RepoError::Duplicate(format!(
            "Template {template_id} already materialized"
        )));
    }

    for occurrence in occurrences {
        insert_with(&mut *tx, occurrence).await?;
    }

    tx.commit().await?;
    Ok(())
}
