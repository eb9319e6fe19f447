use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use fastkit_core::catalog;
use fastkit_core::project_manager::{ProjectManager, ProjectManagerConfig};
use fastkit_core::FastkitError;

mod commands;
mod logging;

/// fastkit - install, migrate, launch and ship a Fastlib project
#[derive(Parser)]
#[command(name = "fastkit")]
#[command(about = "Task runner for Fastlib web projects")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Path to the project root (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync project dependencies
    Install,
    /// Generate a migration from the current models
    #[command(alias = "generate-migration")]
    Db,
    /// Apply migrations up to the latest revision
    #[command(alias = "apply-migration")]
    Dp,
    /// Install, migrate, then run the application in the foreground
    #[command(alias = "dev-start")]
    Dev,
    /// Install, migrate, then launch the application detached
    #[command(alias = "prod-start")]
    Start,
    /// Run the lint hooks over every tracked file
    Lint,
    /// Run the test suite under coverage and render an HTML report
    Test,
    /// Clean, then build the container image
    #[command(alias = "image-build")]
    Image,
    /// Build, then push the container image
    #[command(alias = "image-push")]
    Push,
    /// Remove build, docs, coverage and log artifacts
    Clean,
    /// Show the task table
    Help,
    /// Show the execution order for a task without running it
    Plan {
        /// Task name or alias
        task: String,
    },
    /// Print the JSON schema of fastkit.yml
    Schema,
}

impl Commands {
    /// Canonical task name for commands that run a task
    fn task_name(&self) -> Option<&'static str> {
        match self {
            Self::Install => Some(catalog::INSTALL),
            Self::Db => Some(catalog::GENERATE_MIGRATION),
            Self::Dp => Some(catalog::APPLY_MIGRATION),
            Self::Dev => Some(catalog::DEV_START),
            Self::Start => Some(catalog::PROD_START),
            Self::Lint => Some(catalog::LINT),
            Self::Test => Some(catalog::TEST),
            Self::Image => Some(catalog::IMAGE_BUILD),
            Self::Push => Some(catalog::IMAGE_PUSH),
            Self::Clean => Some(catalog::CLEAN),
            Self::Help | Self::Plan { .. } | Self::Schema => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that need no project configuration
    match &cli.command {
        Commands::Help => return commands::help::execute(),
        Commands::Schema => return commands::schema::execute(),
        _ => {}
    }

    tracing::debug!(root = %cli.root.display(), "loading project");
    let manager = ProjectManager::new(ProjectManagerConfig {
        project_root: cli.root,
    })?;

    match cli.command {
        Commands::Plan { task } => commands::plan::execute(&manager, &task),
        command => match command.task_name() {
            Some(task) => commands::run::execute(&manager, task),
            None => Ok(()),
        },
    }
}

/// Step failures surface the failing step's exit status
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<FastkitError>()
        .map(FastkitError::exit_code)
        .unwrap_or(1)
}
