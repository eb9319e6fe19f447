//! Task definitions and the task catalog
//!
//! A [`Task`] is a named, ordered list of [`Step`]s plus the tasks that must
//! succeed before it. The [`TaskCatalog`] owns every task and resolves the
//! short CLI aliases (`db`, `dp`, `dev`, ...) to canonical names.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use colored::*;

use crate::platform::CleanTarget;
use crate::types::{FastkitError, FastkitResult};

/// An external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory relative to the project root
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A single unit of work inside a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run in the foreground and wait for the exit status
    Command(CommandSpec),
    /// Launch without waiting; stdout and stderr go to `log_file`
    Detached {
        command: CommandSpec,
        log_file: PathBuf,
    },
    /// Remove build artifacts through the platform remover
    Clean(Vec<CleanTarget>),
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Self::Command(command) => match &command.cwd {
                Some(dir) => format!("(in {}) {}", dir.display(), command),
                None => command.to_string(),
            },
            Self::Detached { command, log_file } => {
                format!("{} > {} 2>&1 &", command, log_file.display())
            }
            Self::Clean(targets) => {
                let paths = targets
                    .iter()
                    .map(CleanTarget::describe)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("remove {}", paths)
            }
        }
    }
}

/// The error a task reports when one of its steps exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DependencyResolution,
    MigrationGeneration,
    MigrationApply,
    LintViolation,
    TestFailure,
    ImageBuild,
    ImagePush,
    Launch,
}

impl FailureKind {
    pub fn into_error(self, step: String, code: i32) -> FastkitError {
        match self {
            Self::DependencyResolution => FastkitError::DependencyResolution { step, code },
            Self::MigrationGeneration => FastkitError::MigrationGeneration { step, code },
            Self::MigrationApply => FastkitError::MigrationApply { step, code },
            Self::LintViolation => FastkitError::LintViolation { step, code },
            Self::TestFailure => FastkitError::TestFailure { step, code },
            Self::ImageBuild => FastkitError::ImageBuild { step, code },
            Self::ImagePush => FastkitError::ImagePush { step, code },
            Self::Launch => FastkitError::Launch { step, code },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    /// Prerequisites, run in this order before the task's own steps
    pub dependencies: Vec<String>,
    pub steps: Vec<Step>,
    pub failure: Option<FailureKind>,
    /// Set when the task cannot run with the current configuration
    pub blocked_by: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            dependencies: Vec::new(),
            steps: Vec::new(),
            failure: None,
            blocked_by: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        self.dependencies.push(task.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn command(self, command: CommandSpec) -> Self {
        self.step(Step::Command(command))
    }

    pub fn fails_as(mut self, kind: FailureKind) -> Self {
        self.failure = Some(kind);
        self
    }

    pub fn blocked(mut self, reason: impl Into<String>) -> Self {
        self.blocked_by = Some(reason.into());
        self
    }

    /// Map a non-zero step exit to this task's error
    pub fn step_failed(&self, step: &Step, code: i32) -> FastkitError {
        let step = step.describe();
        match self.failure {
            Some(kind) => kind.into_error(step, code),
            None => FastkitError::StepFailed {
                task: self.name.clone(),
                step,
                code,
            },
        }
    }
}

/// Every runnable task, in declaration order
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

impl TaskCatalog {
    /// Build a catalog, rejecting duplicate names/aliases and unknown prerequisites
    pub fn new(tasks: Vec<Task>) -> FastkitResult<Self> {
        let mut seen = HashSet::new();
        for task in &tasks {
            for name in std::iter::once(&task.name).chain(task.aliases.iter()) {
                if !seen.insert(name.as_str()) {
                    return Err(FastkitError::Task(format!(
                        "Task name or alias '{}' is defined more than once",
                        name
                    )));
                }
            }
        }

        for task in &tasks {
            for dep in &task.dependencies {
                if !tasks.iter().any(|t| &t.name == dep) {
                    return Err(FastkitError::Task(format!(
                        "Dependency '{}' not found for task '{}'",
                        dep, task.name
                    )));
                }
            }
        }

        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by canonical name only
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Look up a task by canonical name or alias
    pub fn resolve(&self, name: &str) -> FastkitResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.name == name || t.aliases.iter().any(|a| a == name))
            .ok_or_else(|| FastkitError::Task(format!("Task '{}' not found", name)))
    }
}

/// Get a consistent color for a task name
pub fn get_task_color(task_name: &str) -> Color {
    let hash = task_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Label colors that stay clear of the red/yellow/green used for status lines
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
