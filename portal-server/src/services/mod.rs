//! 服务层 - 预约门户编排服务
//!
//! # 服务列表
//!
//! - [`AppointmentService`] - 预约创建、更新、状态变更、查询与统计
//! - [`RecurringService`] - 周期模板创建与展开
//! - [`AvailabilityService`] - 员工排班槽位
//! - [`ChannelNotifier`] / [`NotificationWorker`] - 通知信号

pub mod appointment;
pub mod availability;
pub mod notifier;
pub mod recurring;

#[cfg(test)]
pub(crate) mod testing;

pub use appointment::{AppointmentService, References, resolve_references};
pub use availability::AvailabilityService;
pub use notifier::{
    AppointmentEvent, AppointmentEventKind, ChannelNotifier, NotificationWorker, Notifier,
};
pub use recurring::RecurringService;
