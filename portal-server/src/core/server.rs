//! Server Implementation
//!
//! 启动后台任务，等待 Ctrl-C 后优雅关闭

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerState};
use crate::services::{AppointmentEvent, NotificationWorker};
use crate::utils::logger;

/// Portal server process
pub struct Server {
    config: Config,
    state: Option<(ServerState, mpsc::Receiver<AppointmentEvent>)>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(
        config: Config,
        state: ServerState,
        events: mpsc::Receiver<AppointmentEvent>,
    ) -> Self {
        Self {
            config,
            state: Some((state, events)),
        }
    }

    pub async fn run(self) -> Result<()> {
        let (state, events) = match self.state {
            Some(s) => s,
            None => ServerState::initialize(&self.config).await?,
        };

        let mut tasks = BackgroundTasks::new();
        tasks.spawn(
            "notification_worker",
            TaskKind::Worker,
            NotificationWorker::new(events).run(tasks.shutdown_token()),
        );
        if let Some(dir) = &self.config.log_dir {
            tasks.spawn(
                "log_cleanup",
                TaskKind::Periodic,
                logger::periodic_cleanup(PathBuf::from(dir), tasks.shutdown_token()),
            );
        }
        tasks.log_summary();

        tracing::info!(
            database = %state.config.database_path,
            timezone = %state.config.timezone,
            "🦀 Scheduling portal ready"
        );

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutting down...");

        tasks.shutdown().await;
        state.db.pool.close().await;
        Ok(())
    }
}
