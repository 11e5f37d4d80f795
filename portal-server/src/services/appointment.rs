//! 预约编排服务
//!
//! 把纯规则（营业时间、冲突、状态机）与存储、目录查询、通知组合起来。
//! 每个操作对应一次请求，失败只影响当前请求。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono_tz::Tz;
use shared::models::{
    Actor, Appointment, AppointmentCreate, AppointmentFilter, AppointmentStatistics,
    AppointmentStatus, AppointmentUpdate, Operation,
};
use shared::pagination::PaginatedResponse;
use shared::util::{now_millis, snowflake_id};

use super::notifier::{AppointmentEvent, AppointmentEventKind, Notifier};
use crate::db::repository::{AppointmentStore, DirectoryLookup, SlotStore};
use crate::scheduling::{
    BusinessHours, EntityKind, SchedulingError, SchedulingResult, availability, conflict, status,
    window,
};
use crate::utils::time;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Ids an appointment (or template) points at
#[derive(Debug, Clone, Copy)]
pub struct References {
    pub supplier_id: i64,
    pub employee_id: i64,
    pub operation_id: i64,
    pub product_id: i64,
}

impl From<&Appointment> for References {
    fn from(a: &Appointment) -> Self {
        Self {
            supplier_id: a.supplier_id,
            employee_id: a.employee_id,
            operation_id: a.operation_id,
            product_id: a.product_id,
        }
    }
}

/// Resolve every reference, returning the operation for the hours check
pub async fn resolve_references(
    directory: &dyn DirectoryLookup,
    refs: References,
) -> SchedulingResult<Operation> {
    let missing = |entity, id| SchedulingError::InvalidReference { entity, id };

    if directory.supplier(refs.supplier_id).await?.is_none() {
        return Err(missing(EntityKind::Supplier, refs.supplier_id));
    }
    if directory.employee(refs.employee_id).await?.is_none() {
        return Err(missing(EntityKind::Employee, refs.employee_id));
    }
    let operation = directory
        .operation(refs.operation_id)
        .await?
        .ok_or_else(|| missing(EntityKind::Operation, refs.operation_id))?;
    if directory.product(refs.product_id).await?.is_none() {
        return Err(missing(EntityKind::Product, refs.product_id));
    }
    Ok(operation)
}

/// 预约编排服务
pub struct AppointmentService {
    directory: Arc<dyn DirectoryLookup>,
    store: Arc<dyn AppointmentStore>,
    slots: Arc<dyn SlotStore>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    date_range_limit_days: i64,
}

impl std::fmt::Debug for AppointmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppointmentService")
            .field("tz", &self.tz)
            .field("date_range_limit_days", &self.date_range_limit_days)
            .finish_non_exhaustive()
    }
}

impl AppointmentService {
    pub fn new(
        directory: Arc<dyn DirectoryLookup>,
        store: Arc<dyn AppointmentStore>,
        slots: Arc<dyn SlotStore>,
        notifier: Arc<dyn Notifier>,
        tz: Tz,
        date_range_limit_days: i64,
    ) -> Self {
        Self {
            directory,
            store,
            slots,
            notifier,
            tz,
            date_range_limit_days,
        }
    }

    fn emit(&self, kind: AppointmentEventKind, appointment: &Appointment) {
        self.notifier
            .notify(AppointmentEvent::new(kind, appointment, now_millis()));
    }

    async fn load(&self, id: i64) -> SchedulingResult<Appointment> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("appointment", id))
    }

    /// Resolve references and run the window check against their operation
    async fn validate_placement(&self, appointment: &Appointment) -> SchedulingResult<()> {
        let operation = resolve_references(self.directory.as_ref(), appointment.into()).await?;
        let hours = BusinessHours::from_operation(&operation)?;
        window::validate_window(
            appointment.scheduled_start,
            appointment.scheduled_end,
            &hours,
            self.tz,
        )
    }

    /// 创建预约（初始状态 pending）
    pub async fn create(&self, payload: AppointmentCreate) -> SchedulingResult<Appointment> {
        if let Some(requested) = payload.status
            && requested != AppointmentStatus::Pending
        {
            return Err(SchedulingError::Validation(format!(
                "New appointments start as pending, got {requested}"
            )));
        }
        validate_quantity(payload.quantity_to_deliver)?;
        validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

        let now = now_millis();
        let appointment = Appointment {
            id: snowflake_id(),
            supplier_id: payload.supplier_id,
            employee_id: payload.employee_id,
            operation_id: payload.operation_id,
            product_id: payload.product_id,
            scheduled_start: payload.scheduled_start,
            scheduled_end: payload.scheduled_end,
            status: AppointmentStatus::Pending,
            quantity_to_deliver: payload.quantity_to_deliver,
            notes: payload.notes,
            cancellation_reason: None,
            confirmed_at: None,
            cancelled_at: None,
            completed_at: None,
            recurring_template_id: None,
            created_at: now,
            updated_at: now,
        };

        self.validate_placement(&appointment).await?;
        conflict::ensure_no_conflict(self.store.as_ref(), &appointment, None).await?;
        self.store.insert(&appointment).await?;

        tracing::info!(
            appointment_id = appointment.id,
            supplier_id = appointment.supplier_id,
            employee_id = appointment.employee_id,
            "Appointment created"
        );
        self.emit(AppointmentEventKind::AppointmentCreated, &appointment);
        Ok(appointment)
    }

    pub async fn get(&self, id: i64) -> SchedulingResult<Appointment> {
        self.load(id).await
    }

    /// 部分更新。终态预约不可修改，状态只能通过 [`Self::update_status`] 变更。
    pub async fn update(&self, id: i64, patch: AppointmentUpdate) -> SchedulingResult<Appointment> {
        let existing = self.load(id).await?;
        if existing.status.is_terminal() {
            return Err(SchedulingError::ImmutableState {
                status: existing.status,
            });
        }

        let mut updated = existing.clone();
        if let Some(v) = patch.supplier_id {
            updated.supplier_id = v;
        }
        if let Some(v) = patch.employee_id {
            updated.employee_id = v;
        }
        if let Some(v) = patch.operation_id {
            updated.operation_id = v;
        }
        if let Some(v) = patch.product_id {
            updated.product_id = v;
        }
        if let Some(v) = patch.scheduled_start {
            updated.scheduled_start = v;
        }
        if let Some(v) = patch.scheduled_end {
            updated.scheduled_end = v;
        }
        if let Some(v) = patch.quantity_to_deliver {
            validate_quantity(v)?;
            updated.quantity_to_deliver = v;
        }
        if patch.notes.is_some() {
            validate_optional_text(&patch.notes, "notes", MAX_NOTE_LEN)?;
            updated.notes = patch.notes;
        }

        self.validate_placement(&updated).await?;

        let moved = updated.scheduled_start != existing.scheduled_start
            || updated.scheduled_end != existing.scheduled_end
            || updated.employee_id != existing.employee_id
            || updated.supplier_id != existing.supplier_id;
        if moved {
            conflict::ensure_no_conflict(self.store.as_ref(), &updated, Some(id)).await?;
        }

        updated.updated_at = now_millis();
        self.store.update(&updated).await?;

        tracing::info!(appointment_id = id, moved, "Appointment updated");
        self.emit(AppointmentEventKind::AppointmentUpdated, &updated);
        Ok(updated)
    }

    /// 软删除
    pub async fn delete(&self, id: i64) -> SchedulingResult<()> {
        let existing = self.load(id).await?;
        self.store.soft_delete(id, now_millis()).await?;

        tracing::info!(appointment_id = id, "Appointment deleted");
        self.emit(AppointmentEventKind::AppointmentDeleted, &existing);
        Ok(())
    }

    /// 状态变更（角色矩阵 + 状态图）
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: i64,
        to: AppointmentStatus,
        reason: Option<&str>,
    ) -> SchedulingResult<Appointment> {
        let mut appointment = self.load(id).await?;
        let from = match status::transition(actor, &mut appointment, to, reason, now_millis()) {
            Ok(from) => from,
            Err(e) => {
                tracing::warn!(appointment_id = id, actor = ?actor, to = %to, error = %e, "Status change rejected");
                return Err(e);
            }
        };
        self.store.update(&appointment).await?;

        tracing::info!(appointment_id = id, from = %from, to = %to, "Appointment status changed");
        self.emit(AppointmentEventKind::for_status(to), &appointment);
        Ok(appointment)
    }

    /// 分页查询
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        if let (Some(start), Some(end)) = (filter.start, filter.end)
            && start > end
        {
            return Err(SchedulingError::InvalidRange { start, end });
        }
        let (data, total) = self.store.list(filter).await?;
        Ok(PaginatedResponse::new(
            data,
            total,
            filter.page(),
            filter.limit(),
        ))
    }

    /// 按调用者范围查询：供应商与员工只能看到自己的预约
    pub async fn list_for_actor(
        &self,
        actor: &Actor,
        mut filter: AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        match *actor {
            Actor::Admin => {}
            Actor::Supplier(id) => filter.supplier_id = Some(id),
            Actor::Employee(id) => filter.employee_id = Some(id),
        }
        if !actor.is_admin()
            && let (Some(start), Some(end)) = (filter.start, filter.end)
            && end > start
        {
            let days = (end - start + DAY_MILLIS - 1) / DAY_MILLIS;
            if days > self.date_range_limit_days {
                return Err(SchedulingError::DateRangeTooWide {
                    days,
                    limit: self.date_range_limit_days,
                });
            }
        }
        self.list(&filter).await
    }

    pub async fn by_supplier(
        &self,
        supplier_id: i64,
        mut filter: AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        filter.supplier_id = Some(supplier_id);
        self.list(&filter).await
    }

    pub async fn by_employee(
        &self,
        employee_id: i64,
        mut filter: AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        filter.employee_id = Some(employee_id);
        self.list(&filter).await
    }

    pub async fn by_operation(
        &self,
        operation_id: i64,
        mut filter: AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        filter.operation_id = Some(operation_id);
        self.list(&filter).await
    }

    /// Appointments starting at or after `start` and ending by `end`
    pub async fn in_date_range(
        &self,
        start: i64,
        end: i64,
        mut filter: AppointmentFilter,
    ) -> SchedulingResult<PaginatedResponse<Appointment>> {
        if start >= end {
            return Err(SchedulingError::InvalidRange { start, end });
        }
        filter.start = Some(start);
        filter.end = Some(end);
        self.list(&filter).await
    }

    /// 即将开始的预约（未取消，按开始时间升序）
    pub async fn upcoming(&self, limit: u32) -> SchedulingResult<Vec<Appointment>> {
        let limit = limit.clamp(1, AppointmentFilter::MAX_LIMIT);
        Ok(self.store.upcoming(now_millis(), limit).await?)
    }

    /// 统计：总数、按状态、按业务时区日期与月份
    pub async fn statistics(&self) -> SchedulingResult<AppointmentStatistics> {
        let points = self.store.schedule_points().await?;

        let mut stats = AppointmentStatistics {
            total: points.len() as u64,
            by_status: BTreeMap::new(),
            ..Default::default()
        };
        for (status, start) in points {
            *stats.by_status.entry(status).or_default() += 1;
            if let Some(date) = time::local_date(start, self.tz) {
                *stats
                    .by_day
                    .entry(date.format("%Y-%m-%d").to_string())
                    .or_default() += 1;
                *stats
                    .by_month
                    .entry(date.format("%Y-%m").to_string())
                    .or_default() += 1;
            }
        }
        Ok(stats)
    }

    /// 员工在某个作业点的时间段是否可预约
    ///
    /// 区间非法或引用缺失返回错误；营业时间外、已有冲突、
    /// 或排班槽位不覆盖时返回 `false`。
    pub async fn check_availability(
        &self,
        operation_id: i64,
        employee_id: i64,
        start: i64,
        end: i64,
    ) -> SchedulingResult<bool> {
        window::validate_range(start, end)?;

        let operation = self.directory.operation(operation_id).await?.ok_or(
            SchedulingError::InvalidReference {
                entity: EntityKind::Operation,
                id: operation_id,
            },
        )?;
        if self.directory.employee(employee_id).await?.is_none() {
            return Err(SchedulingError::InvalidReference {
                entity: EntityKind::Employee,
                id: employee_id,
            });
        }

        let hours = BusinessHours::from_operation(&operation)?;
        match window::validate_window(start, end, &hours, self.tz) {
            Ok(()) => {}
            Err(SchedulingError::OutOfHours { .. }) => return Ok(false),
            Err(e) => return Err(e),
        }

        let booked = self
            .store
            .find_overlapping(
                shared::models::BookingScope::Employee(employee_id),
                start,
                end,
                None,
            )
            .await?;
        if booked
            .iter()
            .any(|a| conflict::overlaps(start, end, a.scheduled_start, a.scheduled_end))
        {
            return Ok(false);
        }

        let slots = self.slots.slots_for(employee_id, operation_id).await?;
        if slots.is_empty() {
            return Ok(true);
        }
        let (Some(local_start), Some(local_end)) =
            (time::to_local(start, self.tz), time::to_local(end, self.tz))
        else {
            return Ok(false);
        };
        Ok(slots.iter().any(|slot| {
            availability::covers(
                slot,
                local_start.date_naive(),
                local_start.time(),
                local_end.time(),
            )
        }))
    }
}
