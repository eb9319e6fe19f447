//! The built-in Fastlib project tasks

use std::path::PathBuf;

use crate::configs::runner::{Environment, RunnerConfig};
use crate::platform::CleanTarget;
use crate::tasks::{CommandSpec, FailureKind, Step, Task, TaskCatalog};
use crate::types::{FastkitError, FastkitResult};

pub const INSTALL: &str = "install";
pub const GENERATE_MIGRATION: &str = "generate-migration";
pub const APPLY_MIGRATION: &str = "apply-migration";
pub const DEV_START: &str = "dev-start";
pub const PROD_START: &str = "prod-start";
pub const LINT: &str = "lint";
pub const TEST: &str = "test";
pub const IMAGE_BUILD: &str = "image-build";
pub const IMAGE_PUSH: &str = "image-push";
pub const CLEAN: &str = "clean";

impl TaskCatalog {
    /// The standard install/migrate/launch/lint/test/image/clean tasks
    pub fn builtin(config: &RunnerConfig) -> FastkitResult<Self> {
        Self::new(builtin_tasks(config))
    }
}

pub fn builtin_tasks(config: &RunnerConfig) -> Vec<Task> {
    let tools = &config.tools;
    let pm = tools.package_manager.as_str();
    let migrate = tools.migration_tool.as_str();
    let coverage = tools.coverage.as_str();

    let image_reference = config.image_reference();

    let mut image_build = Task::new(
        IMAGE_BUILD,
        "Clean, then build the container image <user>/<release>:<tag>",
    )
    .alias("image")
    .depends_on(CLEAN)
    .fails_as(FailureKind::ImageBuild);

    let mut image_push = Task::new(IMAGE_PUSH, "Build, then push the container image")
        .alias("push")
        .depends_on(IMAGE_BUILD)
        .fails_as(FailureKind::ImagePush);

    match image_reference {
        Ok(reference) => {
            image_build = image_build.command(CommandSpec::new(
                tools.container.as_str(),
                ["build", "-t", reference.as_str(), "."],
            ));
            image_push = image_push.command(CommandSpec::new(
                tools.container.as_str(),
                ["push", reference.as_str()],
            ));
        }
        Err(e) => {
            let reason = match e {
                FastkitError::Config(message) => message,
                other => other.to_string(),
            };
            image_build = image_build.blocked(reason.clone());
            image_push = image_push.blocked(reason);
        }
    }

    vec![
        Task::new(INSTALL, "Sync project dependencies")
            .command(CommandSpec::new(pm, ["sync"]))
            .fails_as(FailureKind::DependencyResolution),
        Task::new(GENERATE_MIGRATION, "Generate a migration from the current models")
            .alias("db")
            .command(CommandSpec::new(migrate, ["revision", "--autogenerate"]))
            .fails_as(FailureKind::MigrationGeneration),
        Task::new(APPLY_MIGRATION, "Apply migrations up to the latest revision")
            .alias("dp")
            .command(CommandSpec::new(migrate, ["upgrade", "head"]))
            .fails_as(FailureKind::MigrationApply),
        launch_task(config, Environment::Development),
        launch_task(config, Environment::Production),
        Task::new(LINT, "Run the lint hooks over every tracked file")
            .command(CommandSpec::new(pm, ["add", "--dev", tools.lint_tool.as_str()]))
            .command(CommandSpec::new(
                tools.lint_tool.as_str(),
                ["run", "--all-files", "--verbose"],
            ))
            .fails_as(FailureKind::LintViolation),
        Task::new(TEST, "Run the test suite under coverage and render an HTML report")
            .command(CommandSpec::new(pm, ["sync", "--group", "dev"]))
            .command(CommandSpec::new(migrate, ["upgrade", "head"]))
            .command(
                CommandSpec::new(coverage, ["run", "-m", "pytest"]).in_dir(&config.source_dir),
            )
            .command(CommandSpec::new(coverage, ["html"]).in_dir(&config.source_dir))
            .fails_as(FailureKind::TestFailure),
        image_build,
        image_push,
        Task::new(CLEAN, "Remove build, docs, coverage and log artifacts")
            .step(Step::Clean(clean_targets(config))),
    ]
}

fn launch_task(config: &RunnerConfig, environment: Environment) -> Task {
    let command = CommandSpec::new(
        config.tools.python.as_str(),
        [
            config.tools.entrypoint.as_str(),
            "--env",
            environment.flag(),
        ],
    );

    let task = match environment {
        Environment::Development => Task::new(
            DEV_START,
            "Install, migrate, then run the application in the foreground",
        )
        .alias("dev"),
        Environment::Production => Task::new(
            PROD_START,
            "Install, migrate, then launch the application detached, logging to SERVER_LOG",
        )
        .alias("start"),
    };

    let step = if environment.redirects_output() {
        Step::Detached {
            command,
            log_file: config.server_log.clone(),
        }
    } else {
        Step::Command(command)
    };

    task.depends_on(INSTALL)
        .depends_on(APPLY_MIGRATION)
        .step(step)
        .fails_as(FailureKind::Launch)
}

/// Paths removed by `clean`, relative to the project root
pub fn clean_targets(config: &RunnerConfig) -> Vec<CleanTarget> {
    let source = &config.source_dir;
    vec![
        CleanTarget::Path(PathBuf::from("dist")),
        CleanTarget::Path(PathBuf::from("docs").join("_build")),
        CleanTarget::Path(source.join("htmlcov")),
        CleanTarget::Path(source.join("log")),
        CleanTarget::CoverageData {
            dir: source.clone(),
        },
    ]
}
