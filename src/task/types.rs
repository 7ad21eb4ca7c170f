use crate::env::DEFAULT_TASK_MINUTES;
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Task priority levels ordered by ordinal value
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl TaskPriority {
    /// Get numeric value for comparisons
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Estimated duration, either the engine default or an explicit number of minutes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstimatedDuration {
    #[default]
    Default,
    Explicit(u32),
}

impl EstimatedDuration {
    pub fn minutes(self) -> u32 {
        match self {
            EstimatedDuration::Default => DEFAULT_TASK_MINUTES,
            EstimatedDuration::Explicit(minutes) => minutes,
        }
    }
}

/// The body of a task.
///
/// The engine treats work as opaque and infallible. Implementations must not
/// touch any task other than the one they are handed.
#[async_trait]
pub trait TaskWork: Send + Sync {
    async fn perform(&self, task: &Task);
}

/// Work that does nothing; the default body for registered tasks
pub struct NoopWork;

#[async_trait]
impl TaskWork for NoopWork {
    async fn perform(&self, _task: &Task) {}
}

/// Task specification used to register new tasks
#[derive(Clone)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub duration: EstimatedDuration,
    pub work: Option<Arc<dyn TaskWork>>,
}

impl TaskSpec {
    /// Create a spec with the default estimated duration
    pub fn new(name: &str, description: &str, priority: TaskPriority) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            priority,
            duration: EstimatedDuration::Default,
            work: None,
        }
    }

    /// Set an explicit estimated duration in minutes
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = EstimatedDuration::Explicit(minutes);
        self
    }

    /// Attach the work performed when the task executes
    pub fn with_work(mut self, work: Arc<dyn TaskWork>) -> Self {
        self.work = Some(work);
        self
    }

    /// Reject specs whose estimated duration is not positive; names are opaque labels
    pub fn validate(&self) -> EngineResult<()> {
        if self.duration == EstimatedDuration::Explicit(0) {
            return Err(EngineError::InvalidArgument(format!(
                "task '{}' must have a positive estimated duration",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("duration", &self.duration)
            .field("work", &self.work.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// A unit of work with a priority, an estimated duration and a completion flag.
///
/// `completed` is the only mutable field and only ever moves from false to true.
pub struct Task {
    name: String,
    description: String,
    priority: TaskPriority,
    duration: EstimatedDuration,
    completed: AtomicBool,
    work: Arc<dyn TaskWork>,
}

impl Task {
    /// Build a task from a validated specification
    pub fn from_spec(spec: TaskSpec) -> EngineResult<Self> {
        spec.validate()?;
        Ok(Self {
            name: spec.name,
            description: spec.description,
            priority: spec.priority,
            duration: spec.duration,
            completed: AtomicBool::new(false),
            work: spec.work.unwrap_or_else(|| Arc::new(NoopWork)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn duration(&self) -> EstimatedDuration {
        self.duration
    }

    pub fn estimated_minutes(&self) -> u32 {
        self.duration.minutes()
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Run the task body and mark the task completed.
    ///
    /// Strategies guarantee this is called at most once per task per cycle.
    pub async fn execute(&self) {
        debug!("Executing task: {}", self.name);
        self.work.perform(self).await;
        self.completed.store(true, Ordering::Release);
        debug!("Task completed: {}", self.name);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] - {}",
            self.name,
            self.priority,
            if self.is_completed() {
                "COMPLETED"
            } else {
                "PENDING"
            }
        )
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("duration", &self.duration)
            .field("completed", &self.is_completed())
            .finish()
    }
}
