//! 周期预约模板服务
//!
//! 模板创建后可一次性展开为具体预约（全部成功或全部失败）。
//! 展开后的模板不可再次展开。

use std::sync::Arc;

use chrono_tz::Tz;
use shared::models::{Appointment, RecurringTemplate, RecurringTemplateCreate};
use shared::util::{now_millis, snowflake_id};

use super::appointment::{References, resolve_references};
use super::notifier::{AppointmentEvent, AppointmentEventKind, Notifier};
use crate::db::repository::{AppointmentStore, DirectoryLookup, RepoError, TemplateStore};
use crate::scheduling::{
    BusinessHours, ExpansionLimits, SchedulingError, SchedulingResult, conflict, recurrence,
    window,
};
use crate::utils::time;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

pub struct RecurringService {
    directory: Arc<dyn DirectoryLookup>,
    appointments: Arc<dyn AppointmentStore>,
    templates: Arc<dyn TemplateStore>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    limits: ExpansionLimits,
}

impl RecurringService {
    pub fn new(
        directory: Arc<dyn DirectoryLookup>,
        appointments: Arc<dyn AppointmentStore>,
        templates: Arc<dyn TemplateStore>,
        notifier: Arc<dyn Notifier>,
        tz: Tz,
        limits: ExpansionLimits,
    ) -> Self {
        Self {
            directory,
            appointments,
            templates,
            notifier,
            tz,
            limits,
        }
    }

    pub fn limits(&self) -> ExpansionLimits {
        self.limits
    }

    fn references(t: &RecurringTemplate) -> References {
        References {
            supplier_id: t.supplier_id,
            employee_id: t.employee_id,
            operation_id: t.operation_id,
            product_id: t.product_id,
        }
    }

    /// 创建模板（开始日期不得早于业务时区的今天）
    pub async fn create_template(
        &self,
        payload: RecurringTemplateCreate,
    ) -> SchedulingResult<RecurringTemplate> {
        let now = now_millis();
        let template = RecurringTemplate {
            id: snowflake_id(),
            supplier_id: payload.supplier_id,
            employee_id: payload.employee_id,
            operation_id: payload.operation_id,
            product_id: payload.product_id,
            quantity_to_deliver: payload.quantity_to_deliver,
            notes: payload.notes,
            pattern: payload.pattern,
            start_date: payload.start_date,
            end_date: payload.end_date,
            max_occurrences: payload.max_occurrences,
            start_time_minutes: payload.start_time_minutes,
            duration_minutes: payload.duration_minutes,
            week_days: payload.week_days,
            month_day: payload.month_day,
            exclusion_dates: payload.exclusion_dates,
            materialized_at: None,
            created_at: now,
            updated_at: now,
        };

        recurrence::validate_template(&template)?;
        validate_optional_text(&template.notes, "notes", MAX_NOTE_LEN)?;
        if template.start_date < time::today(self.tz) {
            return Err(SchedulingError::InvalidRecurrence(
                "start_date cannot be in the past".to_string(),
            ));
        }
        resolve_references(self.directory.as_ref(), Self::references(&template)).await?;

        self.templates.insert_template(&template).await?;
        tracing::info!(
            template_id = template.id,
            pattern = ?template.pattern,
            "Recurring template created"
        );
        Ok(template)
    }

    pub async fn get_template(&self, id: i64) -> SchedulingResult<RecurringTemplate> {
        self.templates
            .find_template(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("template", id))
    }

    /// Expand without persisting
    pub async fn preview(&self, id: i64) -> SchedulingResult<Vec<chrono::NaiveDateTime>> {
        let template = self.get_template(id).await?;
        Ok(recurrence::generate_occurrences(&template, &self.limits))
    }

    /// 展开模板并持久化所有预约
    ///
    /// 每个实例都经过营业时间与冲突校验，任一失败则整体不写入。
    pub async fn materialize(&self, id: i64) -> SchedulingResult<Vec<Appointment>> {
        let template = self.get_template(id).await?;
        if template.materialized_at.is_some() {
            return Err(SchedulingError::TemplateImmutable(id));
        }
        recurrence::validate_template(&template)?;

        let operation =
            resolve_references(self.directory.as_ref(), Self::references(&template)).await?;
        let hours = BusinessHours::from_operation(&operation)?;

        let now = now_millis();
        let occurrences =
            recurrence::generate_appointments(&template, &self.limits, self.tz, now, snowflake_id);
        if occurrences.is_empty() {
            return Err(SchedulingError::InvalidRecurrence(
                "template produces no occurrences".to_string(),
            ));
        }

        for occurrence in &occurrences {
            window::validate_window(
                occurrence.scheduled_start,
                occurrence.scheduled_end,
                &hours,
                self.tz,
            )?;
            conflict::ensure_no_conflict(self.appointments.as_ref(), occurrence, None).await?;
        }

        match self
            .templates
            .insert_occurrences(id, &occurrences, now)
            .await
        {
            Ok(()) => {}
            Err(RepoError::Duplicate(_)) => return Err(SchedulingError::TemplateImmutable(id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            template_id = id,
            count = occurrences.len(),
            "Recurring template materialized"
        );
        for occurrence in &occurrences {
            self.notifier.notify(AppointmentEvent::new(
                AppointmentEventKind::AppointmentCreated,
                occurrence,
                now,
            ));
        }
        Ok(occurrences)
    }

    /// 模板已生成的预约
    pub async fn occurrences(&self, id: i64) -> SchedulingResult<Vec<Appointment>> {
        self.get_template(id).await?;
        Ok(self.templates.occurrences(id).await?)
    }
}
