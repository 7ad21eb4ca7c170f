use crate::error::{EngineError, EngineResult};
use crate::task::types::*;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Named execution strategies selectable from configuration
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Sequential,
    Concurrent,
    #[serde(rename = "priority")]
    PriorityOrdered,
}

impl StrategyKind {
    /// Build the strategy this kind names
    pub fn build(self, max_concurrency: Option<usize>) -> EngineResult<Arc<dyn ExecutionStrategy>> {
        let strategy: Arc<dyn ExecutionStrategy> = match self {
            StrategyKind::Sequential => Arc::new(SequentialStrategy),
            StrategyKind::Concurrent => match max_concurrency {
                Some(limit) => Arc::new(ConcurrentStrategy::with_limit(limit)?),
                None => Arc::new(ConcurrentStrategy::new()),
            },
            StrategyKind::PriorityOrdered => Arc::new(PriorityOrderedStrategy),
        };
        Ok(strategy)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyKind::Sequential => "sequential",
            StrategyKind::Concurrent => "concurrent",
            StrategyKind::PriorityOrdered => "priority",
        };
        f.write_str(label)
    }
}

impl FromStr for StrategyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(StrategyKind::Sequential),
            "concurrent" | "parallel" => Ok(StrategyKind::Concurrent),
            "priority" | "by-priority" | "priority-ordered" => Ok(StrategyKind::PriorityOrdered),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown execution strategy '{}'",
                other
            ))),
        }
    }
}

/// Policy controlling the order and concurrency used to run a task sequence.
///
/// `execute` returns only once every task in `tasks` has run. It never
/// reorders or changes the membership of the slice it is given, and runs
/// each task exactly once. A panicking task body does not stop the others;
/// the first panicked task is reported as `TaskPanicked` after all have run.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn execute(&self, tasks: &[Arc<Task>]) -> EngineResult<()>;
}

/// Run tasks one after another, isolating panics per task
async fn run_serially<'a>(tasks: impl IntoIterator<Item = &'a Arc<Task>>) -> EngineResult<()> {
    let mut panicked = None;
    for task in tasks {
        if AssertUnwindSafe(task.execute()).catch_unwind().await.is_err() {
            error!("Task panicked: {}", task.name());
            panicked.get_or_insert_with(|| task.name().to_string());
        }
    }

    match panicked {
        Some(task) => Err(EngineError::TaskPanicked { task }),
        None => Ok(()),
    }
}

/// Runs tasks one at a time in input order
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialStrategy;

#[async_trait]
impl ExecutionStrategy for SequentialStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    async fn execute(&self, tasks: &[Arc<Task>]) -> EngineResult<()> {
        info!("Running {} tasks sequentially", tasks.len());
        run_serially(tasks).await
    }
}

/// Launches every task as its own tokio task and joins on all of them
#[derive(Debug, Default, Clone)]
pub struct ConcurrentStrategy {
    limit: Option<usize>,
}

impl ConcurrentStrategy {
    /// Unbounded: every task is launched at once
    pub fn new() -> Self {
        Self { limit: None }
    }

    /// At most `limit` task bodies run at the same time
    pub fn with_limit(limit: usize) -> EngineResult<Self> {
        if limit == 0 {
            return Err(EngineError::InvalidArgument(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        Ok(Self { limit: Some(limit) })
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[async_trait]
impl ExecutionStrategy for ConcurrentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Concurrent
    }

    async fn execute(&self, tasks: &[Arc<Task>]) -> EngineResult<()> {
        info!(
            "Running {} tasks concurrently (limit: {:?})",
            tasks.len(),
            self.limit
        );

        let permits = self.limit.map(|limit| Arc::new(Semaphore::new(limit)));
        let mut units = JoinSet::new();

        for task in tasks {
            let task = Arc::clone(task);
            let permits = permits.clone();
            units.spawn(async move {
                // Never closed, so acquisition cannot fail
                let _permit = match permits {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = AssertUnwindSafe(task.execute()).catch_unwind().await;
                (task, outcome.is_ok())
            });
        }

        // Join every unit before reporting, even if one of them panicked.
        let mut panicked = None;
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((task, true)) => debug!("Joined task: {}", task.name()),
                Ok((task, false)) => {
                    error!("Task panicked: {}", task.name());
                    panicked.get_or_insert_with(|| task.name().to_string());
                }
                Err(join_error) => {
                    error!("Task unit failed to join: {}", join_error);
                    panicked.get_or_insert_with(|| join_error.to_string());
                }
            }
        }

        match panicked {
            Some(task) => Err(EngineError::TaskPanicked { task }),
            None => Ok(()),
        }
    }
}

/// Runs tasks one at a time, highest priority first, ties in input order
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityOrderedStrategy;

impl PriorityOrderedStrategy {
    /// Descending priority; `sort_by_key` is a stable sort so equal priorities keep input order
    pub fn order(tasks: &[Arc<Task>]) -> Vec<Arc<Task>> {
        let mut ordered = tasks.to_vec();
        ordered.sort_by_key(|task| Reverse(task.priority()));
        ordered
    }
}

#[async_trait]
impl ExecutionStrategy for PriorityOrderedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PriorityOrdered
    }

    async fn execute(&self, tasks: &[Arc<Task>]) -> EngineResult<()> {
        info!("Running {} tasks ordered by priority", tasks.len());
        run_serially(&Self::order(tasks)).await
    }
}
