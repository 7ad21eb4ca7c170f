//! # Taskflow
//!
//! A task execution engine. A [`TaskManager`] owns a sequence of tasks, runs
//! them through one of several pluggable execution strategies and notifies
//! registered listeners when a cycle starts and when every task has completed.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: the task model, execution strategies, lifecycle listeners
//!   and the manager that drives a cycle
//! - **[`report`]**: the boundary to an external reporting service
//! - **[`cli`]**: argument parsing and configuration discovery for the binary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskflow::{LoggingListener, StrategyKind, TaskManager, TaskPriority, TaskSpec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut manager = TaskManager::new();
//!     manager.add_task(TaskSpec::new("Review email", "Answer pending mail", TaskPriority::Medium))?;
//!     manager.add_task(
//!         TaskSpec::new("Prepare presentation", "Slides for the meeting", TaskPriority::High)
//!             .with_duration(120),
//!     )?;
//!     manager.add_listener(Arc::new(LoggingListener));
//!     manager.set_strategy_kind(StrategyKind::PriorityOrdered)?;
//!
//!     let report = manager.run().await?.into_result()?;
//!     println!("{} of {} tasks completed", report.completed_count, report.task_count);
//!     Ok(())
//! }
//! ```

/// Task model, execution strategies, listeners and the task manager.
pub mod task;

/// Forwarding cycle summaries to an external reporting service.
pub mod report;

/// Error taxonomy shared by the engine.
pub mod error;

/// Environment constants and path utilities.
pub mod env;

/// Command line parsing and configuration discovery.
pub mod cli;

pub use error::{EngineError, EngineResult};
pub use report::{ConsoleReportingService, ReportForwarder, ReportingService};
pub use task::{
    BackupListener, CycleReport, EventKind, ExecutionStrategy, LifecycleEvent,
    LifecycleListener, ListenerCategory, LoggingListener, ManagerSummary, NotificationListener,
    StrategyKind, Task, TaskManager, TaskManagerConfig, TaskPriority, TaskSpec, TaskWork,
};
