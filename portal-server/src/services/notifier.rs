//! 预约通知信号
//!
//! 编排器在状态变更成功后发出 [`AppointmentEvent`]（fire-and-forget）。
//! 默认实现 [`ChannelNotifier`] 通过有界 mpsc 通道投递，
//! [`NotificationWorker`] 在后台消费。实际的邮件/短信派发不在本服务内。

use serde::Serialize;
use shared::models::{Appointment, AppointmentStatus};
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentEventKind {
    AppointmentCreated,
    AppointmentUpdated,
    AppointmentConfirmed,
    AppointmentCancelled,
    AppointmentCompleted,
    AppointmentRescheduled,
    /// rescheduled -> pending
    AppointmentReopened,
    AppointmentDeleted,
}

impl AppointmentEventKind {
    /// Event emitted when an appointment enters `status`
    pub fn for_status(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Pending => Self::AppointmentReopened,
            AppointmentStatus::Confirmed => Self::AppointmentConfirmed,
            AppointmentStatus::Cancelled => Self::AppointmentCancelled,
            AppointmentStatus::Completed => Self::AppointmentCompleted,
            AppointmentStatus::Rescheduled => Self::AppointmentRescheduled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentCreated => "appointment_created",
            Self::AppointmentUpdated => "appointment_updated",
            Self::AppointmentConfirmed => "appointment_confirmed",
            Self::AppointmentCancelled => "appointment_cancelled",
            Self::AppointmentCompleted => "appointment_completed",
            Self::AppointmentRescheduled => "appointment_rescheduled",
            Self::AppointmentReopened => "appointment_reopened",
            Self::AppointmentDeleted => "appointment_deleted",
        }
    }
}

impl fmt::Display for AppointmentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通知事件
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentEvent {
    pub kind: AppointmentEventKind,
    pub appointment_id: i64,
    pub supplier_id: i64,
    pub employee_id: i64,
    pub status: AppointmentStatus,
    pub scheduled_start: i64,
    pub occurred_at: i64,
}

impl AppointmentEvent {
    pub fn new(kind: AppointmentEventKind, appointment: &Appointment, occurred_at: i64) -> Self {
        Self {
            kind,
            appointment_id: appointment.id,
            supplier_id: appointment.supplier_id,
            employee_id: appointment.employee_id,
            status: appointment.status,
            scheduled_start: appointment.scheduled_start,
            occurred_at,
        }
    }
}

/// Fire-and-forget sink for appointment events. Must never block or fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: AppointmentEvent);
}

/// 有界通道通知器
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<AppointmentEvent>,
}

impl ChannelNotifier {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AppointmentEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: AppointmentEvent) {
        if let Err(e) = self.tx.try_send(event) {
            let (reason, event) = match e {
                mpsc::error::TrySendError::Full(ev) => ("channel full", ev),
                mpsc::error::TrySendError::Closed(ev) => ("channel closed", ev),
            };
            tracing::warn!(
                kind = %event.kind,
                appointment_id = event.appointment_id,
                reason,
                "Notification dropped"
            );
        }
    }
}

/// 通知后台 Worker
///
/// 消费事件并记录日志，通道关闭或取消时退出。
pub struct NotificationWorker {
    rx: mpsc::Receiver<AppointmentEvent>,
}

impl NotificationWorker {
    pub fn new(rx: mpsc::Receiver<AppointmentEvent>) -> Self {
        Self { rx }
    }

    /// 运行 worker（阻塞直到通道关闭或取消）
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("📨 Notification worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification worker received shutdown signal");
                    break;
                }
                event = self.rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Notification channel closed, worker stopping");
                        break;
                    };
                    tracing::info!(
                        kind = %event.kind,
                        appointment_id = event.appointment_id,
                        supplier_id = event.supplier_id,
                        employee_id = event.employee_id,
                        status = %event.status,
                        "Appointment notification"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt() -> Appointment {
        Appointment {
            id: 1,
            supplier_id: 1,
            employee_id: 2,
            operation_id: 3,
            product_id: 4,
            scheduled_start: 0,
            scheduled_end: 3_600_000,
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
        }
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new(4);
        notifier.notify(AppointmentEvent::new(
            AppointmentEventKind::AppointmentCreated,
            &appt(),
            10,
        ));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, AppointmentEventKind::AppointmentCreated);
        assert_eq!(event.appointment_id, 1);
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (notifier, mut rx) = ChannelNotifier::new(1);
        for _ in 0..3 {
            notifier.notify(AppointmentEvent::new(
                AppointmentEventKind::AppointmentUpdated,
                &appt(),
                0,
            ));
        }
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_channel_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new(1);
        drop(rx);
        notifier.notify(AppointmentEvent::new(
            AppointmentEventKind::AppointmentDeleted,
            &appt(),
            0,
        ));
    }

    #[tokio::test]
    async fn test_worker_stops_on_cancel() {
        let (_notifier, rx) = ChannelNotifier::new(1);
        let token = CancellationToken::new();
        let handle = tokio::spawn(NotificationWorker::new(rx).run(token.clone()));
        token.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn test_event_kind_for_status() {
        assert_eq!(
            AppointmentEventKind::for_status(AppointmentStatus::Pending).as_str(),
            "appointment_reopened"
        );
        assert_eq!(
            serde_json::to_string(&AppointmentEventKind::AppointmentCancelled).unwrap(),
            r#""appointment_cancelled""#
        );
    }
}
