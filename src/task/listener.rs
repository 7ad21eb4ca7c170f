use crate::task::types::Task;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Identifier shared by both events of one execution cycle
pub type CycleId = Uuid;

/// Points in an execution cycle at which listeners are notified
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    ExecutionStart,
    AllCompleted,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::ExecutionStart => f.write_str("EXECUTION_START"),
            EventKind::AllCompleted => f.write_str("ALL_COMPLETED"),
        }
    }
}

/// A lifecycle notification; both events of a cycle borrow the same task sequence
#[derive(Debug, Clone, Copy)]
pub struct LifecycleEvent<'a> {
    pub kind: EventKind,
    pub cycle_id: CycleId,
    pub tasks: &'a [Arc<Task>],
    pub emitted_at: DateTime<Utc>,
}

impl<'a> LifecycleEvent<'a> {
    pub fn new(kind: EventKind, cycle_id: CycleId, tasks: &'a [Arc<Task>]) -> Self {
        Self {
            kind,
            cycle_id,
            tasks,
            emitted_at: Utc::now(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed()).count()
    }
}

/// Capability tag carried by every listener
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListenerCategory {
    Logging,
    Backup,
    Notification,
    Custom,
}

impl fmt::Display for ListenerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ListenerCategory::Logging => "logging",
            ListenerCategory::Backup => "backup",
            ListenerCategory::Notification => "notification",
            ListenerCategory::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// Observer of execution lifecycle events.
///
/// Handlers run synchronously, one listener at a time, in registration order.
/// They must not mutate the tasks they are shown. An `Err` (or a panic) is
/// recorded against this listener and does not stop the others.
pub trait LifecycleListener: Send + Sync {
    fn category(&self) -> ListenerCategory;

    fn on_event(&self, event: &LifecycleEvent<'_>) -> Result<()>;
}

/// A listener error isolated during a notification pass
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Position of the listener in registration order
    pub listener_index: usize,
    pub category: ListenerCategory,
    pub event: EventKind,
    pub message: String,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener #{} ({}) failed on {}: {}",
            self.listener_index, self.category, self.event, self.message
        )
    }
}

/// Records cycle start and completion through tracing
#[derive(Debug, Default)]
pub struct LoggingListener;

impl LifecycleListener for LoggingListener {
    fn category(&self) -> ListenerCategory {
        ListenerCategory::Logging
    }

    fn on_event(&self, event: &LifecycleEvent<'_>) -> Result<()> {
        match event.kind {
            EventKind::ExecutionStart => {
                info!(
                    cycle = %event.cycle_id,
                    "[LOG] Starting execution of {} tasks",
                    event.task_count()
                );
            }
            EventKind::AllCompleted => {
                info!(cycle = %event.cycle_id, "[LOG] Execution finished");
            }
        }
        Ok(())
    }
}

/// Checkpoints signalled by [`BackupListener`]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupCheckpoint {
    PreRun { cycle_id: CycleId, at: DateTime<Utc> },
    PostRun { cycle_id: CycleId, at: DateTime<Utc> },
}

/// Signals a pre-run checkpoint on start and a post-run checkpoint on completion
#[derive(Debug, Default)]
pub struct BackupListener {
    checkpoints: Mutex<Vec<BackupCheckpoint>>,
}

impl BackupListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoints signalled so far, oldest first
    pub fn checkpoints(&self) -> Vec<BackupCheckpoint> {
        self.checkpoints
            .lock()
            .map(|checkpoints| checkpoints.clone())
            .unwrap_or_default()
    }
}

impl LifecycleListener for BackupListener {
    fn category(&self) -> ListenerCategory {
        ListenerCategory::Backup
    }

    fn on_event(&self, event: &LifecycleEvent<'_>) -> Result<()> {
        let checkpoint = match event.kind {
            EventKind::ExecutionStart => {
                info!("[BACKUP] Creating backup before execution");
                BackupCheckpoint::PreRun {
                    cycle_id: event.cycle_id,
                    at: event.emitted_at,
                }
            }
            EventKind::AllCompleted => {
                info!("[BACKUP] Updating backup after execution");
                BackupCheckpoint::PostRun {
                    cycle_id: event.cycle_id,
                    at: event.emitted_at,
                }
            }
        };

        self.checkpoints
            .lock()
            .map_err(|_| anyhow!("backup checkpoint log is poisoned"))?
            .push(checkpoint);
        Ok(())
    }
}

/// Completion count reported by [`NotificationListener`]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionNotice {
    pub cycle_id: CycleId,
    pub completed: usize,
    pub total: usize,
}

/// On completion, reports how many tasks finished out of the total
#[derive(Debug, Default)]
pub struct NotificationListener {
    last_notice: Mutex<Option<CompletionNotice>>,
}

impl NotificationListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notice(&self) -> Option<CompletionNotice> {
        self.last_notice.lock().ok().and_then(|notice| *notice)
    }
}

impl LifecycleListener for NotificationListener {
    fn category(&self) -> ListenerCategory {
        ListenerCategory::Notification
    }

    fn on_event(&self, event: &LifecycleEvent<'_>) -> Result<()> {
        if event.kind != EventKind::AllCompleted {
            return Ok(());
        }

        let notice = CompletionNotice {
            cycle_id: event.cycle_id,
            completed: event.completed_count(),
            total: event.task_count(),
        };
        info!(
            "[NOTIFICATION] {} of {} tasks completed",
            notice.completed, notice.total
        );

        *self
            .last_notice
            .lock()
            .map_err(|_| anyhow!("notification state is poisoned"))? = Some(notice);
        Ok(())
    }
}

/// Build the listener a category names; `Custom` has no built-in listener
pub fn builtin_listener(category: ListenerCategory) -> Option<Arc<dyn LifecycleListener>> {
    match category {
        ListenerCategory::Logging => Some(Arc::new(LoggingListener)),
        ListenerCategory::Backup => Some(Arc::new(BackupListener::new())),
        ListenerCategory::Notification => Some(Arc::new(NotificationListener::new())),
        ListenerCategory::Custom => None,
    }
}
