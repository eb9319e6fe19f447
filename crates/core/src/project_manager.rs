//! High-level project management interface
//!
//! [`ProjectManager`] is the entry point the CLI talks to. It loads the
//! layered configuration once, builds the task catalog from it, selects the
//! cleanup platform, and then plans or runs tasks on request.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fastkit_core::project_manager::{ProjectManager, ProjectManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> fastkit_core::types::FastkitResult<()> {
//! let manager = ProjectManager::new(ProjectManagerConfig {
//!     project_root: PathBuf::from("."),
//! })?;
//!
//! // Show what `dev` would do
//! let plan = manager.plan("dev")?;
//!
//! // Install, migrate and start the application
//! manager.run("dev")?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use crate::configs::runner::RunnerConfig;
use crate::execution::command::{ProcessLauncher, SystemLauncher};
use crate::execution::runner::TaskRunner;
use crate::platform::PathRemover;
use crate::results::{ExecutionPlan, RunReport, TaskInfo};
use crate::tasks::TaskCatalog;
use crate::types::FastkitResult;

/// Configuration for initializing a project manager
pub struct ProjectManagerConfig {
    pub project_root: PathBuf,
}

/// Owns the resolved configuration, task catalog and platform capabilities
pub struct ProjectManager {
    pub config: RunnerConfig,
    pub catalog: TaskCatalog,
    remover: Box<dyn PathRemover>,
    launcher: Box<dyn ProcessLauncher>,
}

impl ProjectManager {
    /// Load configuration from the project root and the process environment
    pub fn new(config: ProjectManagerConfig) -> FastkitResult<Self> {
        let runner_config = RunnerConfig::load(&config.project_root)?;
        Self::with_launcher(runner_config, Box::new(SystemLauncher))
    }

    /// Build from an already-resolved configuration and a custom launcher
    pub fn with_launcher(
        config: RunnerConfig,
        launcher: Box<dyn ProcessLauncher>,
    ) -> FastkitResult<Self> {
        let catalog = TaskCatalog::builtin(&config)?;
        let remover = config.platform.remover();
        tracing::debug!(
            root = %config.project_root.display(),
            platform = config.platform.as_str(),
            "project manager ready"
        );

        Ok(Self {
            config,
            catalog,
            remover,
            launcher,
        })
    }

    /// Task descriptions for the help table. Reads no configuration.
    pub fn help_table() -> FastkitResult<Vec<TaskInfo>> {
        let catalog = TaskCatalog::builtin(&RunnerConfig::new("."))?;
        Ok(catalog.tasks().iter().map(TaskInfo::from).collect())
    }

    pub fn plan(&self, task: &str) -> FastkitResult<ExecutionPlan> {
        self.runner().plan(task)
    }

    pub fn run(&self, task: &str) -> FastkitResult<RunReport> {
        self.runner().run(task)
    }

    fn runner(&self) -> TaskRunner<'_> {
        TaskRunner::new(
            &self.catalog,
            &self.config,
            self.remover.as_ref(),
            self.launcher.as_ref(),
        )
    }
}
