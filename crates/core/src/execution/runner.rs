//! High-level task runner
//!
//! Resolves a task's prerequisites, checks that every task in the plan can run
//! with the current configuration, then executes steps strictly in order and
//! stops at the first failure.

use colored::*;

use crate::configs::runner::RunnerConfig;
use crate::execution::command::{CommandExecutor, ProcessLauncher};
use crate::execution::dependencies::resolve_execution_order;
use crate::platform::PathRemover;
use crate::results::{ExecutionPlan, PlannedTask, RunReport, StepOutcome, StepRecord};
use crate::tasks::{get_task_color, Step, Task, TaskCatalog};
use crate::types::{FastkitError, FastkitResult};

/// Sequential, fail-fast task runner
pub struct TaskRunner<'a> {
    catalog: &'a TaskCatalog,
    config: &'a RunnerConfig,
    remover: &'a dyn PathRemover,
    launcher: &'a dyn ProcessLauncher,
}

impl<'a> TaskRunner<'a> {
    pub fn new(
        catalog: &'a TaskCatalog,
        config: &'a RunnerConfig,
        remover: &'a dyn PathRemover,
        launcher: &'a dyn ProcessLauncher,
    ) -> Self {
        Self {
            catalog,
            config,
            remover,
            launcher,
        }
    }

    /// Resolve what `run` would execute without executing anything
    pub fn plan(&self, target: &str) -> FastkitResult<ExecutionPlan> {
        let order = resolve_execution_order(self.catalog, target)?;

        let tasks = order
            .iter()
            .filter_map(|name| self.catalog.get(name))
            .map(|task| PlannedTask {
                name: task.name.clone(),
                steps: task.steps.iter().map(Step::describe).collect(),
                blocked_by: task.blocked_by.clone(),
            })
            .collect();

        Ok(ExecutionPlan {
            target: self.catalog.resolve(target)?.name.clone(),
            tasks,
        })
    }

    /// Run `target` and its prerequisites
    pub fn run(&self, target: &str) -> FastkitResult<RunReport> {
        let plan = self.plan(target)?;

        if let Some(blocked) = plan.first_blocked() {
            return Err(FastkitError::Config(format!(
                "Task '{}' cannot run: {}",
                blocked.name,
                blocked.blocked_by.as_deref().unwrap_or_default()
            )));
        }

        let mut report = RunReport {
            target: plan.target.clone(),
            steps: Vec::new(),
        };

        for planned in &plan.tasks {
            let task = self.catalog.get(&planned.name).ok_or_else(|| {
                FastkitError::Task(format!("Task '{}' not found", planned.name))
            })?;
            self.run_task(task, &mut report)?;
        }

        tracing::info!(task = %plan.target, steps = report.steps.len(), "run finished");
        Ok(report)
    }

    fn run_task(&self, task: &Task, report: &mut RunReport) -> FastkitResult<()> {
        let color = get_task_color(&task.name);
        println!();
        println!(
            "┌─ {}",
            format!("Running task '{}'", task.name).color(color).bold()
        );
        println!("└─ {}", task.description.bright_black());

        tracing::info!(task = %task.name, steps = task.steps.len(), "task started");

        let executor = CommandExecutor::new(self.launcher, &self.config.project_root);

        for step in &task.steps {
            let outcome = match step {
                Step::Command(command) => {
                    executor.execute_command(command, |code| task.step_failed(step, code))?;
                    StepOutcome::Completed
                }
                Step::Detached { command, log_file } => {
                    let pid = executor.spawn_detached(command, log_file)?;
                    StepOutcome::Detached {
                        pid,
                        log_file: self.config.project_root.join(log_file),
                    }
                }
                Step::Clean(targets) => {
                    let cleanup = self
                        .remover
                        .remove_paths(&self.config.project_root, targets)?;
                    for warning in &cleanup.warnings {
                        tracing::debug!(
                            path = %warning.path.display(),
                            reason = %warning.reason,
                            "cleanup warning"
                        );
                    }
                    println!(
                        "{} {}",
                        "✓".green().bold(),
                        format!(
                            "Removed {} path(s) [{}]",
                            cleanup.removed.len(),
                            self.remover.platform().as_str()
                        )
                        .dimmed()
                    );
                    StepOutcome::Cleaned(cleanup)
                }
            };

            report.steps.push(StepRecord {
                task: task.name.clone(),
                step: step.describe(),
                outcome,
            });
        }

        tracing::info!(task = %task.name, "task finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, clean_targets};
    use crate::platform::{Platform, PosixRemover};
    use crate::tasks::CommandSpec;
    use std::cell::RefCell;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Records every launch; exits non-zero for commands listed in `failing`
    #[derive(Default)]
    struct RecordingLauncher {
        failing: Vec<(String, i32)>,
        calls: RefCell<Vec<String>>,
        detached: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl RecordingLauncher {
        fn failing(command: &str, code: i32) -> Self {
            Self {
                failing: vec![(command.to_string(), code)],
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessLauncher for RecordingLauncher {
        fn run(&self, _cwd: &Path, command: &CommandSpec) -> io::Result<Option<i32>> {
            let line = command.to_string();
            self.calls.borrow_mut().push(line.clone());
            let code = self
                .failing
                .iter()
                .find(|(failing, _)| *failing == line)
                .map(|(_, code)| *code)
                .unwrap_or(0);
            Ok(Some(code))
        }

        fn spawn_detached(
            &self,
            cwd: &Path,
            command: &CommandSpec,
            log_file: &Path,
        ) -> io::Result<u32> {
            self.calls.borrow_mut().push(format!("detached: {}", command));
            self.detached
                .borrow_mut()
                .push((cwd.to_path_buf(), log_file.to_path_buf()));
            Ok(4242)
        }
    }

    fn config(root: &Path) -> RunnerConfig {
        let mut config = RunnerConfig::new(root);
        config.platform = Platform::Posix;
        config
    }

    fn with_image(mut config: RunnerConfig) -> RunnerConfig {
        config.image.user = Some("acme".to_string());
        config.image.release = Some("fast-web".to_string());
        config.image.tag = Some("1.0.0".to_string());
        config
    }

    #[test]
    fn dev_start_runs_prerequisites_then_launches() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let report = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("dev")
            .unwrap();

        assert_eq!(
            launcher.calls(),
            vec!["uv sync", "alembic upgrade head", "python main.py --env dev"]
        );
        assert_eq!(report.target, "dev-start");
        assert_eq!(report.steps.len(), 3);
        assert!(report.detached_pid().is_none());
    }

    #[test]
    fn failed_install_prevents_launch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();

        for target in ["dev", "start"] {
            let launcher = RecordingLauncher::failing("uv sync", 2);
            let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
                .run(target)
                .unwrap_err();

            assert!(matches!(err, FastkitError::DependencyResolution { code: 2, .. }));
            assert_eq!(err.exit_code(), 2);
            assert_eq!(launcher.calls(), vec!["uv sync"]);
        }
    }

    #[test]
    fn failed_migration_prevents_launch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::failing("alembic upgrade head", 1);

        let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("start")
            .unwrap_err();

        assert!(matches!(err, FastkitError::MigrationApply { code: 1, .. }));
        assert_eq!(launcher.calls(), vec!["uv sync", "alembic upgrade head"]);
        assert!(launcher.detached.borrow().is_empty());
    }

    #[test]
    fn prod_start_detaches_with_server_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = config(temp_dir.path());
        config.server_log = PathBuf::from("logs/server.log");
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let report = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("start")
            .unwrap();

        assert_eq!(report.detached_pid(), Some(4242));
        assert_eq!(
            launcher.calls().last().map(String::as_str),
            Some("detached: python main.py --env prod")
        );
        let detached = launcher.detached.borrow();
        assert_eq!(detached[0].0, temp_dir.path());
        assert_eq!(detached[0].1, temp_dir.path().join("logs/server.log"));
    }

    #[test]
    fn steps_within_a_task_fail_fast() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::failing("coverage run -m pytest", 5);

        let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("test")
            .unwrap_err();

        assert!(matches!(err, FastkitError::TestFailure { code: 5, .. }));
        assert_eq!(
            launcher.calls(),
            vec![
                "uv sync --group dev",
                "alembic upgrade head",
                "coverage run -m pytest"
            ]
        );
    }

    #[test]
    fn lint_failure_reports_violation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::failing("pre-commit run --all-files --verbose", 1);

        let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("lint")
            .unwrap_err();

        assert!(matches!(err, FastkitError::LintViolation { code: 1, .. }));
        assert_eq!(launcher.calls().len(), 2);
    }

    #[test]
    fn image_build_cleans_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("dist")).unwrap();
        let config = with_image(config(temp_dir.path()));
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let report = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("image")
            .unwrap();

        assert!(!temp_dir.path().join("dist").exists());
        assert_eq!(report.steps[0].task, catalog::CLEAN);
        assert_eq!(
            launcher.calls(),
            vec!["docker build -t acme/fast-web:1.0.0 ."]
        );
    }

    #[test]
    fn unset_image_naming_aborts_before_any_step() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("dist")).unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("push")
            .unwrap_err();

        assert!(matches!(err, FastkitError::Config(_)));
        assert!(launcher.calls().is_empty());
        // clean never ran
        assert!(temp_dir.path().join("dist").exists());
    }

    #[test]
    fn plan_lists_blocked_tasks_without_running() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let plan = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .plan("push")
            .unwrap();

        assert_eq!(plan.target, catalog::IMAGE_PUSH);
        assert_eq!(
            plan.task_names(),
            vec![catalog::CLEAN, catalog::IMAGE_BUILD, catalog::IMAGE_PUSH]
        );
        assert_eq!(plan.first_blocked().unwrap().name, catalog::IMAGE_BUILD);
        assert!(launcher.calls().is_empty());
    }

    #[test]
    fn clean_task_reports_removed_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("src/htmlcov")).unwrap();
        std::fs::write(root.join("src/.coverage"), "data").unwrap();
        let config = config(root);
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let report = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("clean")
            .unwrap();

        match &report.steps[0].outcome {
            StepOutcome::Cleaned(cleanup) => assert_eq!(cleanup.removed.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(clean_targets(&config).len(), 5);
    }

    #[test]
    fn unknown_task_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config(temp_dir.path());
        let catalog = TaskCatalog::builtin(&config).unwrap();
        let launcher = RecordingLauncher::default();

        let err = TaskRunner::new(&catalog, &config, &PosixRemover, &launcher)
            .run("deploy")
            .unwrap_err();
        assert!(matches!(err, FastkitError::Task(_)));
    }
}
