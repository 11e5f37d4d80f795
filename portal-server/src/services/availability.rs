//! 员工排班槽位服务

use std::sync::Arc;

use shared::models::{AvailabilitySlot, AvailabilitySlotCreate};
use shared::util::{now_millis, snowflake_id};

use crate::db::repository::{DirectoryLookup, SlotStore};
use crate::scheduling::{EntityKind, SchedulingError, SchedulingResult, availability};

pub struct AvailabilityService {
    directory: Arc<dyn DirectoryLookup>,
    slots: Arc<dyn SlotStore>,
}

impl AvailabilityService {
    pub fn new(directory: Arc<dyn DirectoryLookup>, slots: Arc<dyn SlotStore>) -> Self {
        Self { directory, slots }
    }

    /// 新增槽位，同一员工同一作业点的槽位不得重叠
    pub async fn add_slot(&self, payload: AvailabilitySlotCreate) -> SchedulingResult<AvailabilitySlot> {
        availability::validate_slot(&payload)?;

        if self.directory.employee(payload.employee_id).await?.is_none() {
            return Err(SchedulingError::InvalidReference {
                entity: EntityKind::Employee,
                id: payload.employee_id,
            });
        }
        if self.directory.operation(payload.operation_id).await?.is_none() {
            return Err(SchedulingError::InvalidReference {
                entity: EntityKind::Operation,
                id: payload.operation_id,
            });
        }

        let now = now_millis();
        let slot = AvailabilitySlot {
            id: snowflake_id(),
            employee_id: payload.employee_id,
            operation_id: payload.operation_id,
            day_of_week: payload.day_of_week,
            start_time: payload.start_time.trim().to_string(),
            end_time: payload.end_time.trim().to_string(),
            is_recurring: payload.is_recurring,
            specific_date: if payload.is_recurring {
                None
            } else {
                payload.specific_date
            },
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let existing = self
            .slots
            .slots_for(slot.employee_id, slot.operation_id)
            .await?;
        if let Some(clash) = existing.iter().find(|s| availability::slots_overlap(s, &slot)) {
            return Err(SchedulingError::SlotConflict(clash.id));
        }

        self.slots.insert_slot(&slot).await?;
        tracing::info!(
            slot_id = slot.id,
            employee_id = slot.employee_id,
            operation_id = slot.operation_id,
            "Availability slot added"
        );
        Ok(slot)
    }

    /// 有效槽位
    pub async fn slots_for(
        &self,
        employee_id: i64,
        operation_id: i64,
    ) -> SchedulingResult<Vec<AvailabilitySlot>> {
        Ok(self.slots.slots_for(employee_id, operation_id).await?)
    }

    pub async fn deactivate_slot(&self, id: i64) -> SchedulingResult<()> {
        let slot = self
            .slots
            .find_slot(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("slot", id))?;
        if !slot.is_active {
            return Ok(());
        }
        self.slots.deactivate_slot(id, now_millis()).await?;
        tracing::info!(slot_id = id, "Availability slot deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;
    use shared::models::WeekDay;

    fn payload(start: &str, end: &str) -> AvailabilitySlotCreate {
        AvailabilitySlotCreate {
            employee_id: Fixture::EMPLOYEE,
            operation_id: Fixture::OPERATION,
            day_of_week: WeekDay::Tuesday,
            start_time: start.into(),
            end_time: end.into(),
            is_recurring: true,
            specific_date: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_slots() {
        let fx = Fixture::new().await;
        let a = fx.availability.add_slot(payload("08:00", "12:00")).await.unwrap();
        fx.availability.add_slot(payload("12:00", "16:00")).await.unwrap();

        let slots = fx
            .availability
            .slots_for(Fixture::EMPLOYEE, Fixture::OPERATION)
            .await
            .unwrap();
        assert_eq!(slots.len(), 2);

        let clash = fx.availability.add_slot(payload("11:00", "13:00")).await;
        assert!(matches!(clash, Err(SchedulingError::SlotConflict(id)) if id == a.id));
    }

    #[tokio::test]
    async fn test_deactivate_slot() {
        let fx = Fixture::new().await;
        let a = fx.availability.add_slot(payload("08:00", "12:00")).await.unwrap();
        fx.availability.deactivate_slot(a.id).await.unwrap();
        // idempotent
        fx.availability.deactivate_slot(a.id).await.unwrap();

        assert!(
            fx.availability
                .slots_for(Fixture::EMPLOYEE, Fixture::OPERATION)
                .await
                .unwrap()
                .is_empty()
        );
        // the freed window can be reused
        fx.availability.add_slot(payload("09:00", "10:00")).await.unwrap();

        assert!(matches!(
            fx.availability.deactivate_slot(7).await,
            Err(SchedulingError::NotFound { entity: "slot", .. })
        ));
    }

    #[tokio::test]
    async fn test_slot_references() {
        let fx = Fixture::new().await;
        let mut p = payload("08:00", "12:00");
        p.operation_id = 404;
        assert!(matches!(
            fx.availability.add_slot(p).await,
            Err(SchedulingError::InvalidReference {
                entity: EntityKind::Operation,
                ..
            })
        ));
    }
}
