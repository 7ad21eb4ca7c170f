use crate::error::{EngineError, EngineResult};
use crate::task::listener::*;
use crate::task::strategy::*;
use crate::task::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Central task management system: owns the tasks, the strategy and the listeners
pub struct TaskManager {
    tasks: Vec<Arc<Task>>,
    strategy: Option<Arc<dyn ExecutionStrategy>>,
    listeners: Vec<Arc<dyn LifecycleListener>>,
    config: TaskManagerConfig,
    phase: Mutex<CyclePhase>,
}

/// Configuration for task manager
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskManagerConfig {
    /// Strategy selected at construction; `None` leaves the manager unconfigured
    pub strategy: Option<StrategyKind>,
    /// Upper bound on simultaneously running bodies for the concurrent strategy
    pub max_concurrency: Option<usize>,
}

/// Where a manager is within its execution cycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Starting,
    Executing,
    Completing,
}

/// Outcome of one completed execution cycle
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub strategy: StrategyKind,
    pub task_count: usize,
    pub completed_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub listener_failures: Vec<ListenerFailure>,
}

impl CycleReport {
    pub fn all_completed(&self) -> bool {
        self.completed_count == self.task_count
    }

    /// Surface isolated listener failures as an error
    pub fn into_result(self) -> EngineResult<Self> {
        if self.listener_failures.is_empty() {
            Ok(self)
        } else {
            Err(EngineError::ListenerFailures(self.listener_failures))
        }
    }
}

/// Read-only view of the manager's registered state
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ManagerSummary {
    pub task_count: usize,
    pub total_estimated_minutes: u64,
    pub listener_categories: BTreeSet<ListenerCategory>,
    pub strategy: Option<StrategyKind>,
}

impl ManagerSummary {
    pub fn has_category(&self, category: ListenerCategory) -> bool {
        self.listener_categories.contains(&category)
    }
}

impl fmt::Display for ManagerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggle = |category| {
            if self.has_category(category) {
                "enabled"
            } else {
                "disabled"
            }
        };

        writeln!(f, "=== TASK SUMMARY ===")?;
        writeln!(f, "Total tasks: {}", self.task_count)?;
        writeln!(f, "Notifications: {}", toggle(ListenerCategory::Notification))?;
        writeln!(f, "Logging: {}", toggle(ListenerCategory::Logging))?;
        writeln!(f, "Backup: {}", toggle(ListenerCategory::Backup))?;
        match self.strategy {
            Some(kind) => writeln!(f, "Strategy: {}", kind)?,
            None => writeln!(f, "Strategy: not configured")?,
        }
        write!(
            f,
            "Total estimated time: {} minutes",
            self.total_estimated_minutes
        )
    }
}

/// Holds the manager's phase for the duration of one cycle and resets it on drop
struct CycleGuard<'a> {
    phase: &'a Mutex<CyclePhase>,
}

impl<'a> CycleGuard<'a> {
    fn enter(phase: &'a Mutex<CyclePhase>) -> EngineResult<Self> {
        let mut current = phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current != CyclePhase::Idle {
            return Err(EngineError::CycleInProgress);
        }
        *current = CyclePhase::Starting;
        Ok(Self { phase })
    }

    fn advance(&self, next: CyclePhase) {
        let mut current = self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("Cycle phase: {:?} -> {:?}", *current, next);
        *current = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.advance(CyclePhase::Idle);
    }
}

/// Task manager operations
impl TaskManager {
    /// Create an unconfigured task manager
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            strategy: None,
            listeners: Vec::new(),
            config: TaskManagerConfig::default(),
            phase: Mutex::new(CyclePhase::Idle),
        }
    }

    /// Create a task manager, selecting the configured strategy if any
    pub fn from_config(config: TaskManagerConfig) -> EngineResult<Self> {
        let mut manager = Self {
            config,
            ..Self::new()
        };
        if let Some(kind) = manager.config.strategy {
            manager.set_strategy_kind(kind)?;
        }
        Ok(manager)
    }

    /// Register a task; malformed specs are rejected before anything is stored
    pub fn add_task(&mut self, spec: TaskSpec) -> EngineResult<Arc<Task>> {
        let task = Arc::new(Task::from_spec(spec)?);
        debug!(
            "Registered task '{}' [{}] ({} min)",
            task.name(),
            task.priority(),
            task.estimated_minutes()
        );
        self.tasks.push(Arc::clone(&task));
        Ok(task)
    }

    /// Replace the active strategy; takes effect from the next cycle
    pub fn set_strategy(&mut self, strategy: Arc<dyn ExecutionStrategy>) {
        info!("Execution strategy set to {}", strategy.kind());
        self.strategy = Some(strategy);
    }

    /// Select one of the built-in strategies by name
    pub fn set_strategy_kind(&mut self, kind: StrategyKind) -> EngineResult<()> {
        let strategy = kind.build(self.config.max_concurrency)?;
        self.set_strategy(strategy);
        Ok(())
    }

    /// Register a listener; notification follows registration order
    pub fn add_listener(&mut self, listener: Arc<dyn LifecycleListener>) {
        debug!("Registered {} listener", listener.category());
        self.listeners.push(listener);
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        self.strategy.as_ref().map(|strategy| strategy.kind())
    }

    pub fn phase(&self) -> CyclePhase {
        *self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run one execution cycle.
    ///
    /// Emits `EXECUTION_START`, runs every task through the active strategy,
    /// then emits `ALL_COMPLETED`. Listener failures are collected in the
    /// returned report rather than aborting the cycle. If the strategy fails,
    /// `ALL_COMPLETED` is skipped and any `EXECUTION_START` listener failures
    /// travel with the error as `CycleAborted`. There is no timeout:
    /// a task body that never finishes keeps the cycle open.
    pub async fn run(&self) -> EngineResult<CycleReport> {
        let strategy = self.strategy.clone().ok_or(EngineError::NotConfigured)?;
        let guard = CycleGuard::enter(&self.phase)?;

        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            cycle = %cycle_id,
            "Starting execution of {} tasks with {} strategy",
            self.tasks.len(),
            strategy.kind()
        );

        let mut listener_failures = self.emit_event(LifecycleEvent::new(
            EventKind::ExecutionStart,
            cycle_id,
            &self.tasks,
        ));

        guard.advance(CyclePhase::Executing);
        if let Err(e) = strategy.execute(&self.tasks).await {
            error!(cycle = %cycle_id, "Execution cycle aborted: {}", e);
            if listener_failures.is_empty() {
                return Err(e);
            }
            return Err(EngineError::CycleAborted {
                source: Box::new(e),
                listener_failures,
            });
        }

        guard.advance(CyclePhase::Completing);
        let event = LifecycleEvent::new(EventKind::AllCompleted, cycle_id, &self.tasks);
        let completed_count = event.completed_count();
        listener_failures.extend(self.emit_event(event));

        let report = CycleReport {
            cycle_id,
            strategy: strategy.kind(),
            task_count: self.tasks.len(),
            completed_count,
            started_at,
            finished_at: Utc::now(),
            listener_failures,
        };
        drop(guard);

        if report.listener_failures.is_empty() {
            info!(cycle = %cycle_id, "Completed {} tasks", report.completed_count);
        } else {
            warn!(
                cycle = %cycle_id,
                "Completed {} tasks with {} listener failure(s)",
                report.completed_count,
                report.listener_failures.len()
            );
        }
        Ok(report)
    }

    /// Current registered state; no side effects
    pub fn summary(&self) -> ManagerSummary {
        ManagerSummary {
            task_count: self.tasks.len(),
            total_estimated_minutes: self
                .tasks
                .iter()
                .map(|task| u64::from(task.estimated_minutes()))
                .sum(),
            listener_categories: self
                .listeners
                .iter()
                .map(|listener| listener.category())
                .collect(),
            strategy: self.strategy_kind(),
        }
    }

    /// Deliver an event to every listener in order, isolating failures
    fn emit_event(&self, event: LifecycleEvent<'_>) -> Vec<ListenerFailure> {
        let mut failures = Vec::new();

        for (index, listener) in self.listeners.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            error!(
                "Listener #{} ({}) failed on {}: {}",
                index,
                listener.category(),
                event.kind,
                message
            );
            failures.push(ListenerFailure {
                listener_index: index,
                category: listener.category(),
                event: event.kind,
                message,
            });
        }

        failures
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
