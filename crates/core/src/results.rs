//! Result types for task operations
//!
//! Everything the [`ProjectManager`](crate::project_manager::ProjectManager)
//! hands back to the CLI for presentation lives here.

use std::path::PathBuf;

use crate::platform::CleanupReport;
use crate::tasks::Task;

/// A row of the help table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub dependencies: Vec<String>,
}

impl From<&Task> for TaskInfo {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            aliases: task.aliases.clone(),
            description: task.description.clone(),
            dependencies: task.dependencies.clone(),
        }
    }
}

/// One task in an execution plan
#[derive(Debug, Clone)]
pub struct PlannedTask {
    pub name: String,
    pub steps: Vec<String>,
    pub blocked_by: Option<String>,
}

/// Resolved order of tasks for a target, prerequisites first
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub target: String,
    pub tasks: Vec<PlannedTask>,
}

impl ExecutionPlan {
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// First task in the plan that cannot run with the current configuration
    pub fn first_blocked(&self) -> Option<&PlannedTask> {
        self.tasks.iter().find(|t| t.blocked_by.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Detached { pid: u32, log_file: PathBuf },
    Cleaned(CleanupReport),
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub task: String,
    pub step: String,
    pub outcome: StepOutcome,
}

/// Steps executed by a successful run, in order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub target: String,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    /// Process id of the detached launch, if the run performed one
    pub fn detached_pid(&self) -> Option<u32> {
        self.steps.iter().find_map(|record| match record.outcome {
            StepOutcome::Detached { pid, .. } => Some(pid),
            _ => None,
        })
    }
}
