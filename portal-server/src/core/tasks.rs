//! 后台任务
//!
//! 门户进程只有两类后台工作：消费预约事件的通知 worker，
//! 以及按小时清理日志的定时任务。两者共享一个取消令牌，
//! 关闭时先取消，再在宽限期内等待退出，超时则强制中止。

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Time tasks get to observe cancellation before they are aborted
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs for the whole process lifetime (event consumers)
    Worker,
    /// Wakes on a timer (log retention)
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Worker => "worker",
            TaskKind::Periodic => "periodic",
        })
    }
}

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskExit {
    Stopped,
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// 后台任务集合
pub struct BackgroundTasks {
    set: JoinSet<(&'static str, TaskExit)>,
    registered: Vec<(&'static str, TaskKind)>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            set: JoinSet::new(),
            registered: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token every task should select on
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn `future`; a panic is caught and reported instead of unwinding
    /// into the runtime.
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        self.set.spawn(async move {
            let exit = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) => TaskExit::Stopped,
                Err(payload) => TaskExit::Panicked(panic_message(&*payload)),
            };
            match &exit {
                TaskExit::Stopped if token.is_cancelled() => {
                    tracing::debug!(task = name, %kind, "Background task stopped");
                }
                TaskExit::Stopped => {
                    tracing::warn!(task = name, %kind, "Background task exited before shutdown");
                }
                TaskExit::Panicked(msg) => {
                    tracing::error!(task = name, %kind, panic = %msg, "Background task panicked");
                }
            }
            (name, exit)
        });
        self.registered.push((name, kind));
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn log_summary(&self) {
        let names: Vec<String> = self
            .registered
            .iter()
            .map(|(name, kind)| format!("{name} ({kind})"))
            .collect();
        tracing::info!(count = names.len(), tasks = %names.join(", "), "Background tasks running");
    }

    /// Cancel and wait up to [`SHUTDOWN_GRACE`]
    pub async fn shutdown(self) -> Vec<(&'static str, TaskExit)> {
        self.shutdown_within(SHUTDOWN_GRACE).await
    }

    /// Cancel every task, collect exits, abort whatever outlives `grace`
    pub async fn shutdown_within(mut self, grace: Duration) -> Vec<(&'static str, TaskExit)> {
        self.shutdown.cancel();

        let mut exits = Vec::with_capacity(self.registered.len());
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = self.set.join_next().await {
                if let Ok(exit) = joined {
                    exits.push(exit);
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(remaining = self.set.len(), "Shutdown grace elapsed, aborting tasks");
            self.set.abort_all();
            while self.set.join_next().await.is_some() {}
        }
        tracing::info!(stopped = exits.len(), "Background tasks shut down");
        exits
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
