//! Command execution utilities
//!
//! Process creation sits behind [`ProcessLauncher`] so the runner can be
//! driven by the real system or by a scripted launcher in tests.
//! [`CommandExecutor`] layers the common error handling and output on top.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use colored::*;

use crate::tasks::CommandSpec;
use crate::types::{FastkitError, FastkitResult, UNKNOWN_EXIT_CODE};

/// Creates processes for task steps
pub trait ProcessLauncher {
    /// Run to completion with inherited stdio.
    /// Returns the exit code, or `None` when the process was killed by a signal.
    fn run(&self, cwd: &Path, command: &CommandSpec) -> io::Result<Option<i32>>;

    /// Start without waiting. Stdout and stderr are appended to `log_file`.
    /// Returns the child's process id.
    fn spawn_detached(&self, cwd: &Path, command: &CommandSpec, log_file: &Path)
        -> io::Result<u32>;
}

/// Launches real operating-system processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run(&self, cwd: &Path, command: &CommandSpec) -> io::Result<Option<i32>> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .status()?;
        Ok(status.code())
    }

    fn spawn_detached(
        &self,
        cwd: &Path,
        command: &CommandSpec,
        log_file: &Path,
    ) -> io::Result<u32> {
        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        let stderr = stdout.try_clone()?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        configure_detached(&mut cmd);

        // The child handle is dropped on purpose; nothing waits on it.
        let child = cmd.spawn()?;
        Ok(child.id())
    }
}

fn configure_detached(cmd: &mut Command) {
    // Own process group so terminal signals sent to the runner don't reach it
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }
}

/// Runs task commands relative to the project root with consistent error handling
pub struct CommandExecutor<'a> {
    launcher: &'a dyn ProcessLauncher,
    root: &'a Path,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(launcher: &'a dyn ProcessLauncher, root: &'a Path) -> Self {
        Self { launcher, root }
    }

    fn working_dir(&self, command: &CommandSpec) -> PathBuf {
        match &command.cwd {
            Some(dir) => self.root.join(dir),
            None => self.root.to_path_buf(),
        }
    }

    /// Run a foreground command; a non-zero exit is turned into an error by `on_failure`
    pub fn execute_command<F>(&self, command: &CommandSpec, on_failure: F) -> FastkitResult<()>
    where
        F: FnOnce(i32) -> FastkitError,
    {
        let cwd = self.working_dir(command);
        tracing::debug!(command = %command, cwd = %cwd.display(), "running step");

        let code = self
            .launcher
            .run(&cwd, command)
            .map_err(|source| FastkitError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        match code {
            Some(0) => {
                println!("{} {}", "✓".green().bold(), command.to_string().dimmed());
                Ok(())
            }
            Some(code) => Err(on_failure(code)),
            None => Err(on_failure(UNKNOWN_EXIT_CODE)),
        }
    }

    /// Launch a command detached, redirecting its output to `log_file`
    pub fn spawn_detached(&self, command: &CommandSpec, log_file: &Path) -> FastkitResult<u32> {
        let cwd = self.working_dir(command);
        let log_path = self.root.join(log_file);

        let pid = self
            .launcher
            .spawn_detached(&cwd, command, &log_path)
            .map_err(|source| FastkitError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        tracing::info!(pid, log = %log_path.display(), "launched detached process");
        println!(
            "{} {} {}",
            "✓".green().bold(),
            format!("Started {} (pid {})", command, pid),
            format!("→ {}", log_path.display()).dimmed()
        );
        Ok(pid)
    }
}
